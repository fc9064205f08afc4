//! User-script prolog scanning
//!
//! Injected scripts under includes/ may carry a Greasemonkey-style header;
//! its @include/@exclude lines become the content script's glob lists.

use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserScriptGlobs {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

/// Scan the text before `==/UserScript==` for glob directives. Scripts with
/// no include directive match every page.
pub fn parse_userscript_prolog(source: &str) -> UserScriptGlobs {
    lazy_static! {
        static ref INCLUDE: Regex = Regex::new(r"@include\s+(\S+)").unwrap();
        static ref EXCLUDE: Regex = Regex::new(r"@exclude\s+(\S+)").unwrap();
    }

    let mut globs = UserScriptGlobs::default();
    if let Some(end) = source.find("==/UserScript==") {
        let prolog = &source[..end];
        for capture in INCLUDE.captures_iter(prolog) {
            globs.includes.push(capture[1].to_string());
        }
        for capture in EXCLUDE.captures_iter(prolog) {
            globs.excludes.push(capture[1].to_string());
        }
    }
    if globs.includes.is_empty() {
        globs.includes.push("*".to_string());
    }
    globs
}
