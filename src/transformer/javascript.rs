//! Per-file JavaScript transformation
//!
//! Drives the rewrite engine for one script at a time: decode the bytes,
//! rewrite, and wrap the result for the runtime shim. Some packages ship
//! JSON data files with a .js name; those pass through untouched.

use std::path::Path;

use super::shims::wrap_in_is_ready;
use crate::error::PackageError;
use crate::models::Permission;
use crate::rewriter::{ParseMode, RewriteError, RewriteOptions, ScriptRewriter};
use crate::utils::decode_text;

pub struct ScriptTransformer {
    rewriter: ScriptRewriter,
    parse_mode: ParseMode,
}

#[derive(Debug, Clone)]
pub struct TransformedScript {
    pub text: String,
    pub is_json: bool,
    /// False when the source was passed through without rewriting.
    pub rewritten: bool,
    pub permission_hints: Vec<Permission>,
    pub has_button: bool,
    pub warnings: Vec<String>,
}

impl ScriptTransformer {
    pub fn new(options: RewriteOptions, parse_mode: ParseMode) -> Self {
        Self {
            rewriter: ScriptRewriter::with_options(options),
            parse_mode,
        }
    }

    pub fn transform(&self, bytes: &[u8], path: &Path) -> Result<TransformedScript, PackageError> {
        let source = decode_text(bytes);
        self.transform_source(&source, path)
    }

    pub fn transform_source(
        &self,
        source: &str,
        path: &Path,
    ) -> Result<TransformedScript, PackageError> {
        match self.rewriter.rewrite_script(source) {
            Ok(result) => Ok(TransformedScript {
                text: wrap_in_is_ready(&result.rewritten_text),
                is_json: false,
                rewritten: true,
                permission_hints: result.permission_hints,
                has_button: result.has_button,
                warnings: result.warnings,
            }),
            Err(RewriteError::Parse(reason)) => {
                if serde_json::from_str::<serde_json::Value>(source).is_ok() {
                    return Ok(passthrough(source, true, Vec::new()));
                }
                match self.parse_mode {
                    ParseMode::Lenient => Ok(passthrough(
                        source,
                        false,
                        vec![format!(
                            "Script parsing failed. This script might need manual fixing.\nFile: {}",
                            path.display()
                        )],
                    )),
                    ParseMode::Strict => Err(PackageError::InvalidPackage(format!(
                        "script {} failed to parse: {}",
                        path.display(),
                        reason
                    ))),
                }
            }
            Err(RewriteError::RecursionLimitExceeded { limit }) => Ok(passthrough(
                source,
                false,
                vec![format!(
                    "Script nesting exceeds the traversal limit of {}; left unmodified.\nFile: {}",
                    limit,
                    path.display()
                )],
            )),
        }
    }
}

fn passthrough(source: &str, is_json: bool, warnings: Vec<String>) -> TransformedScript {
    TransformedScript {
        text: source.to_string(),
        is_json,
        rewritten: false,
        permission_hints: Vec::new(),
        has_button: false,
        warnings,
    }
}
