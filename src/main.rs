//! Opera to Chromium Extension Converter CLI

use clap::{Parser, Subcommand};
use colored::*;
use oex2nex::scripts::fetch_shims;
use oex2nex::{
    analyze_extension, convert_extension, packager, report, ConversionOptions,
    FunctionExportStrategy, ParseMode,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oex2nex")]
#[command(about = "Convert Opera .oex extensions to Chromium-compatible .nex packages", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an Opera extension to a .nex package
    Convert {
        /// Path to the Opera extension (.oex file or unpacked directory)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for the converted extension
        #[arg(short, long)]
        output: PathBuf,

        /// Write an unpacked directory instead of a .nex archive
        #[arg(short = 'd', long)]
        unpacked: bool,

        /// Skip interactive prompts and use defaults
        #[arg(short = 'y', long)]
        yes: bool,

        /// Generate a markdown conversion report next to the output
        #[arg(short, long)]
        report: bool,

        /// Abort the conversion when a script fails to parse
        #[arg(long)]
        strict: bool,

        /// Export top-level functions as anonymous expressions
        /// (historical behavior; breaks self-recursive functions)
        #[arg(long)]
        anonymous_functions: bool,
    },

    /// Analyze an extension without converting it
    Analyze {
        /// Path to the extension
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Download the real runtime shim builds
    FetchShims {
        /// Directory to place the oex_shim folder in
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            unpacked,
            yes,
            report: want_report,
            strict,
            anonymous_functions,
        } => {
            println!("{}", "Opera to Chromium Extension Converter".bold().blue());
            println!("{}", "=".repeat(50).blue());
            println!();

            let mut options = ConversionOptions {
                parse_mode: if strict {
                    ParseMode::Strict
                } else {
                    ParseMode::Lenient
                },
                function_export: if anonymous_functions {
                    FunctionExportStrategy::Anonymous
                } else {
                    FunctionExportStrategy::PreserveName
                },
                unpacked_output: unpacked,
                generate_report: want_report,
            };

            if !yes {
                options = match oex2nex::cli::resolve_options(options) {
                    Ok(options) => options,
                    Err(e) => {
                        eprintln!("{}", format!("Error: {}", e).red());
                        std::process::exit(1);
                    }
                };
            }

            match convert_extension(&input, &output, options) {
                Ok(result) => {
                    println!("{}", "Conversion completed.".green().bold());
                    println!();
                    println!("Summary:");
                    println!("  - Files modified: {}", result.modified_files.len());
                    println!("  - Files added: {}", result.new_files.len());
                    println!("  - Output: {}", output.display());

                    if want_report {
                        let report_path = output.with_extension("md");
                        let report_content = report::generate_markdown_report(&result);
                        if std::fs::write(&report_path, report_content).is_ok() {
                            println!("  - Report: {}", report_path.display());
                        }
                    }

                    if !result.report.warnings.is_empty() {
                        println!();
                        for warning in &result.report.warnings {
                            println!("{} {}", "Warning:".yellow().bold(), warning);
                        }
                    }
                }
                Err(e) => {
                    eprintln!("{}", "Conversion failed!".red().bold());
                    eprintln!("{}", format!("Error: {}", e).red());
                    std::process::exit(1);
                }
            }
        }

        Commands::Analyze { input } => {
            println!("{}", "Analyzing extension...".bold());
            println!();

            let context = packager::load_extension(&input)
                .and_then(analyze_extension)
                .unwrap_or_else(|e| {
                    eprintln!("{}", "Failed to load extension!".red().bold());
                    eprintln!("{}", format!("Error: {}", e).red());
                    std::process::exit(1)
                });

            println!("{}", "Analysis Results".bold().blue());
            println!("{}", "=".repeat(50).blue());
            println!();
            println!(
                "Extension: {} v{}",
                context.source.metadata.name, context.source.metadata.version
            );
            println!("Files: {}", context.source.metadata.file_count);
            println!();

            if context.incompatibilities.is_empty() {
                println!("{}", "No incompatibilities found.".green());
            } else {
                println!(
                    "{}",
                    format!("Found {} findings:", context.incompatibilities.len()).yellow()
                );
                println!();
                for issue in &context.incompatibilities {
                    let severity = match issue.severity {
                        oex2nex::models::Severity::Blocker => "BLOCKER".red(),
                        oex2nex::models::Severity::Major => "MAJOR".yellow(),
                        oex2nex::models::Severity::Minor => "MINOR".blue(),
                        oex2nex::models::Severity::Info => "INFO".white(),
                    };
                    println!("{} [{}]", severity, issue.location);
                    println!("  {}", issue.description);
                    if let Some(suggestion) = &issue.suggestion {
                        println!("  {}", suggestion.dimmed());
                    }
                    println!();
                }
            }
        }

        Commands::FetchShims { dir } => {
            println!("{}", "Fetching runtime shim builds".bold().blue());
            println!();

            let runtime = tokio::runtime::Runtime::new().expect("failed to initialize async runtime");
            if let Err(err) = runtime.block_on(fetch_shims::run(&dir)) {
                eprintln!("{}", "Failed to fetch shims".red().bold());
                eprintln!("{}", format!("Error: {err}").red());
                std::process::exit(1);
            }
            println!("{}", "Shims written.".green().bold());
        }
    }
}
