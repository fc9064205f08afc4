//! Conversion report generation

pub mod generator;

pub use generator::generate_markdown_report;
