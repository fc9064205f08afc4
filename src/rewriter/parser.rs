//! JavaScript parsing for the rewrite engine
//!
//! Wraps the SWC parser in classic-script mode and keeps the source map
//! around so the walker can extract exact source snippets by span.

use swc_core::common::{
    sync::Lrc, FileName, FilePathMapping, SourceMap, SourceMapper, Span, GLOBALS,
};
use swc_core::ecma::ast::Script;
use swc_core::ecma::parser::{EsSyntax, Parser, StringInput, Syntax};

use super::RewriteError;

/// Parser producing span-addressable scripts.
pub struct ScriptParser {
    source_map: Lrc<SourceMap>,
}

impl ScriptParser {
    pub fn new() -> Self {
        Self {
            source_map: Lrc::new(SourceMap::new(FilePathMapping::empty())),
        }
    }

    /// Parse source text as a classic script (the source API surface predates
    /// ES modules; module syntax in an input file is a parse failure).
    pub fn parse(&self, code: &str) -> Result<ParsedScript, RewriteError> {
        GLOBALS.set(&Default::default(), || {
            let source_file = self
                .source_map
                .new_source_file(FileName::Anon.into(), code.to_string());

            let input = StringInput::from(&*source_file);
            let mut parser = Parser::new(Self::syntax(), input, None);

            parser
                .parse_script()
                .map(|script| ParsedScript {
                    script,
                    source_map: self.source_map.clone(),
                })
                .map_err(|e| RewriteError::Parse(format!("{:?}", e)))
        })
    }

    fn syntax() -> Syntax {
        Syntax::Es(EsSyntax {
            jsx: false,
            fn_bind: false,
            decorators: false,
            decorators_before_export: false,
            export_default_from: false,
            import_attributes: false,
            allow_super_outside_method: false,
            allow_return_outside_function: false,
            auto_accessors: false,
            explicit_resource_management: false,
        })
    }
}

impl Default for ScriptParser {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed script plus the source map its spans resolve against.
pub struct ParsedScript {
    pub script: Script,
    source_map: Lrc<SourceMap>,
}

impl ParsedScript {
    /// The exact source text a span covers, or `None` when the span does not
    /// resolve (a per-subtree failure the caller records as a warning).
    pub fn snippet(&self, span: Span) -> Option<String> {
        self.source_map.span_to_snippet(span).ok()
    }
}
