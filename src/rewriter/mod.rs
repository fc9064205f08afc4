//! Alias-tracking AST rewrite engine
//!
//! The core of the converter: parses a script, walks it once to discover
//! aliases of the tracked source-API globals, rewrites the recognized
//! constructs by patching the original text, and reports permission hints
//! discovered along the way. The engine never touches the filesystem,
//! archives or network; callers hand it whole script texts.

pub mod aliases;
pub mod finder;
pub mod parser;
pub mod patcher;
pub mod walker;

pub use aliases::{AliasTable, Role};
pub use parser::{ParsedScript, ScriptParser};
pub use patcher::TextPatcher;
pub use walker::{RewriteKind, RewriteRecord};

use crate::models::Permission;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("script parse failure: {0}")]
    Parse(String),

    #[error("recursion limit of {limit} exceeded while walking script")]
    RecursionLimitExceeded { limit: usize },
}

/// How a top-level `function f() {}` is exported onto the window object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionExportStrategy {
    /// Keep the declaration and append `var f = window["f"] = f;`.
    /// Self-recursion keeps working; the name may shadow a later duplicate.
    PreserveName,
    /// Replace the declaration with `var f = window["f"] = function () {}`.
    /// Historical behavior; breaks functions that call themselves by name.
    Anonymous,
}

/// What to do when a script cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Warn and pass the file through unmodified.
    Lenient,
    /// Treat the package as invalid.
    Strict,
}

#[derive(Debug, Clone)]
pub struct RewriteOptions {
    pub function_export: FunctionExportStrategy,
    /// Track `.toolbar` initializers as toolbar aliases. Button detection
    /// through the alias table depends on this.
    pub track_toolbar_aliases: bool,
    /// Traversal nesting bound; exceeding it fails the file with
    /// `RecursionLimitExceeded` instead of overflowing the stack.
    pub max_depth: usize,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            function_export: FunctionExportStrategy::PreserveName,
            track_toolbar_aliases: true,
            max_depth: 512,
        }
    }
}

/// Outcome of rewriting one script.
#[derive(Debug, Clone)]
pub struct RewriteResult {
    pub rewritten_text: String,
    pub permission_hints: Vec<Permission>,
    pub has_button: bool,
    pub warnings: Vec<String>,
}

/// Facade over parse + walk + patch + permission scan.
pub struct ScriptRewriter {
    parser: ScriptParser,
    options: RewriteOptions,
}

impl ScriptRewriter {
    pub fn new() -> Self {
        Self::with_options(RewriteOptions::default())
    }

    pub fn with_options(options: RewriteOptions) -> Self {
        Self {
            parser: ScriptParser::new(),
            options,
        }
    }

    pub fn options(&self) -> &RewriteOptions {
        &self.options
    }

    /// Parse without rewriting, for callers that drive the finders directly.
    pub fn parse(&self, source: &str) -> Result<ParsedScript, RewriteError> {
        self.parser.parse(source)
    }

    /// Rewrite one script. A fresh alias table is seeded per call; aliasing
    /// never crosses file boundaries. Re-running on already-rewritten output
    /// is unsupported.
    pub fn rewrite_script(&self, source: &str) -> Result<RewriteResult, RewriteError> {
        let script = self.parser.parse(source)?;
        self.rewrite_parsed(source, &script)
    }

    /// Rewrite a script the caller already parsed (shares the tree with
    /// independent finder calls).
    pub fn rewrite_parsed(
        &self,
        source: &str,
        script: &ParsedScript,
    ) -> Result<RewriteResult, RewriteError> {
        let mut aliases = AliasTable::seeded();
        let outcome = walker::walk_script(script, &mut aliases, &self.options);
        if outcome.limit_hit {
            return Err(RewriteError::RecursionLimitExceeded {
                limit: self.options.max_depth,
            });
        }

        let mut warnings = outcome.warnings;
        let (rewritten_text, patch_warnings) = TextPatcher::new(outcome.records).apply(source);
        warnings.extend(patch_warnings);

        let mut permission_hints = Vec::new();
        if let Some(permission) =
            finder::find_first_api_call(script, &["create", "getAll", "getFocused", "getSelected"])
        {
            permission_hints.push(permission);
        }
        if let Some(permission) = finder::find_first_api_call(script, &["add", "remove"]) {
            permission_hints.push(permission);
        }

        let has_button = outcome.has_button || finder::find_button(script);

        Ok(RewriteResult {
            rewritten_text,
            permission_hints,
            has_button,
            warnings,
        })
    }
}

impl Default for ScriptRewriter {
    fn default() -> Self {
        Self::new()
    }
}
