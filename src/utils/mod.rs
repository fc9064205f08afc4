//! Utility helpers

pub mod helpers;

pub use helpers::*;
