//! Opera to Chromium Extension Converter
//!
//! A library for converting Opera .oex extensions into Chromium-compatible
//! .nex packages. Handles config.xml to manifest.json translation, AST-based
//! JavaScript rewriting for the runtime shims, and package assembly.

pub mod analyzer;
pub mod error;
pub mod models;
pub mod packager;
pub mod parser;
pub mod report;
pub mod rewriter;
pub mod transformer;
pub mod utils;
pub mod validator;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod scripts;

pub use analyzer::analyze_extension;
pub use error::PackageError;
pub use models::{ConversionContext, ConversionResult, Extension, Manifest};
pub use rewriter::{FunctionExportStrategy, ParseMode, RewriteResult, ScriptRewriter};
pub use transformer::transform_extension;

use anyhow::Result;
use std::path::Path;

/// Main entry point for converting an Opera extension package.
pub fn convert_extension(
    input_path: &Path,
    output_path: &Path,
    options: ConversionOptions,
) -> Result<ConversionResult> {
    // 1. Extract/load extension
    let extension = packager::load_extension(input_path)?;

    // 2. Analyze for incompatibilities
    let context = analyze_extension(extension)?;

    // 3. Transform scripts, pages and metadata
    let result = transform_extension(context, &options)?;

    // 4. Validate the assembled output
    validator::validate_result(&result)?;

    // 5. Write the package
    packager::build_package(&result, output_path, options.unpacked_output)?;

    Ok(result)
}

#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Lenient keeps unparseable scripts with a warning; Strict fails the
    /// conversion.
    pub parse_mode: ParseMode,
    /// How top-level function declarations are exported onto window.
    pub function_export: FunctionExportStrategy,
    /// Write an unpacked directory instead of a .nex archive.
    pub unpacked_output: bool,
    pub generate_report: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            parse_mode: ParseMode::Lenient,
            function_export: FunctionExportStrategy::PreserveName,
            unpacked_output: false,
            generate_report: true,
        }
    }
}
