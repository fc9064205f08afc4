//! Interactive decision prompts for the converter CLI

use anyhow::Result;
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Select};

use crate::{ConversionOptions, FunctionExportStrategy, ParseMode};

/// Walk the user through the conversion choices that have no single right
/// answer, starting from the defaults in `options`.
pub fn resolve_options(mut options: ConversionOptions) -> Result<ConversionOptions> {
    println!(
        "{}",
        "A few choices affect how scripts are rewritten:".bold()
    );

    let strategies = [
        "Keep function names and export them onto window (recommended)",
        "Rewrite to anonymous function expressions (historical behavior, breaks self-recursion)",
    ];
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Top-level function export strategy")
        .items(&strategies)
        .default(0)
        .interact()?;
    options.function_export = match selection {
        1 => FunctionExportStrategy::Anonymous,
        _ => FunctionExportStrategy::PreserveName,
    };

    let strict = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt("Abort the conversion when a script fails to parse?")
        .default(false)
        .interact()?;
    options.parse_mode = if strict {
        ParseMode::Strict
    } else {
        ParseMode::Lenient
    };

    Ok(options)
}
