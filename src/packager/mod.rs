//! Package I/O: source loading and output building

pub mod builder;
pub mod extractor;

pub use builder::{assemble_output, build_package};
pub use extractor::{load_extension, load_from_archive, load_from_directory};
