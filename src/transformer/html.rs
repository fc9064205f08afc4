//! HTML page surgery
//!
//! Background, popup and options pages need the runtime shim loaded first
//! and their inline scripts rewritten. Inline script bodies move to external
//! files (the target CSP forbids inline code); the shim tag is injected at
//! the top of head. Tag handling is regex-based; full DOM policy stays
//! outside the core.

use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;

use super::javascript::ScriptTransformer;
use super::shims::{wrap_in_is_ready, ANYPAGE_SHIM, BACKGROUND_SHIM};
use crate::error::PackageError;
use crate::models::{NewFile, Permission};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Background,
    Popup,
    Options,
    Other,
}

impl PageKind {
    fn shim_path(self) -> &'static str {
        match self {
            PageKind::Background => BACKGROUND_SHIM,
            _ => ANYPAGE_SHIM,
        }
    }

    fn label(self) -> &'static str {
        match self {
            PageKind::Background => "index",
            PageKind::Popup => "popup",
            PageKind::Options => "option",
            PageKind::Other => "page",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageTransform {
    pub html: String,
    pub extra_files: Vec<NewFile>,
    pub permission_hints: Vec<Permission>,
    pub has_button: bool,
    pub warnings: Vec<String>,
}

/// Rewrite one HTML page: externalize and rewrite inline scripts, inject the
/// shim (and, for the background page, the exported default preferences).
pub fn shim_wrap(
    html: &str,
    kind: PageKind,
    prefs: Option<&[(String, String)]>,
    scripts: &ScriptTransformer,
) -> Result<PageTransform, PackageError> {
    let mut page = PageTransform::default();

    let html = externalize_inline_scripts(html, kind, scripts, &mut page)?;

    let mut head_scripts = format!("<script src=\"/{}\"></script>", kind.shim_path());
    if kind == PageKind::Background {
        if let Some(prefs) = prefs.filter(|p| !p.is_empty()) {
            let pref_file = exported_prefs_file(prefs);
            head_scripts.push_str(&format!("<script src=\"/{}\"></script>", pref_file.path.display()));
            page.extra_files.push(pref_file);
        }
    }

    page.html = inject_into_head(&html, &head_scripts);
    Ok(page)
}

/// Move every inline script body into `inline_script_<page>_<n>.js`,
/// rewriting it on the way. External script tags are left in place.
fn externalize_inline_scripts(
    html: &str,
    kind: PageKind,
    scripts: &ScriptTransformer,
    page: &mut PageTransform,
) -> Result<String, PackageError> {
    lazy_static! {
        static ref SCRIPT_TAG: Regex =
            Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").unwrap();
        static ref SRC_ATTR: Regex = Regex::new(r#"(?i)\bsrc\s*="#).unwrap();
    }

    let mut output = String::with_capacity(html.len());
    let mut last_end = 0;
    let mut script_count = 0;

    for captures in SCRIPT_TAG.captures_iter(html) {
        let whole = captures.get(0).unwrap();
        let attrs = &captures[1];
        let body = captures[2].trim();

        output.push_str(&html[last_end..whole.start()]);
        last_end = whole.end();

        if SRC_ATTR.is_match(attrs) || body.is_empty() {
            output.push_str(whole.as_str());
            continue;
        }

        script_count += 1;
        let file_name = format!("inline_script_{}_{}.js", kind.label(), script_count);
        let transformed = scripts.transform_source(body, &PathBuf::from(&file_name))?;
        page.warnings.extend(transformed.warnings.iter().cloned());
        page.permission_hints
            .extend(transformed.permission_hints.iter().copied());
        page.has_button |= transformed.has_button;

        output.push_str(&format!("<script src=\"{}\"></script>", file_name));
        page.extra_files.push(NewFile {
            path: PathBuf::from(file_name),
            content: transformed.text,
            purpose: format!("externalized inline script from {} page", kind.label()),
        });
    }
    output.push_str(&html[last_end..]);
    Ok(output)
}

/// Default preference values from config.xml, exported once on first run.
fn exported_prefs_file(prefs: &[(String, String)]) -> NewFile {
    let mut body = String::new();
    for (name, value) in prefs {
        body.push_str(&format!(
            "widget.preferences.setItem({}, {});\n",
            json_string(name),
            json_string(value)
        ));
    }
    let guarded = format!(
        "if (!widget.preferences.getItem(\"_OPERA_INTERNAL_defaultPrefsSet\")) {{\n{}}}\n\
         widget.preferences.setItem(\"_OPERA_INTERNAL_defaultPrefsSet\", true);\n",
        body
    );
    NewFile {
        path: PathBuf::from("exported_prefs.js"),
        content: wrap_in_is_ready(&guarded),
        purpose: "default preference values from config.xml".to_string(),
    }
}

fn json_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value))
}

/// Insert markup at the top of head, falling back to the top of the document.
fn inject_into_head(html: &str, markup: &str) -> String {
    lazy_static! {
        static ref HEAD_OPEN: Regex = Regex::new(r"(?i)<head[^>]*>").unwrap();
        static ref HTML_OPEN: Regex = Regex::new(r"(?i)<html[^>]*>").unwrap();
    }
    if let Some(found) = HEAD_OPEN.find(html) {
        let mut output = html.to_string();
        output.insert_str(found.end(), markup);
        return output;
    }
    if let Some(found) = HTML_OPEN.find(html) {
        let mut output = html.to_string();
        output.insert_str(found.end(), markup);
        return output;
    }
    format!("{}{}", markup, html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewriter::{ParseMode, RewriteOptions};

    fn transformer() -> ScriptTransformer {
        ScriptTransformer::new(RewriteOptions::default(), ParseMode::Lenient)
    }

    #[test]
    fn test_shim_injected_into_head() {
        let html = "<html><head><title>t</title></head><body></body></html>";
        let page = shim_wrap(html, PageKind::Popup, None, &transformer()).unwrap();
        let shim_pos = page.html.find(ANYPAGE_SHIM).unwrap();
        let title_pos = page.html.find("<title>").unwrap();
        assert!(shim_pos < title_pos);
    }

    #[test]
    fn test_background_page_gets_background_shim() {
        let html = "<html><head></head><body></body></html>";
        let page = shim_wrap(html, PageKind::Background, None, &transformer()).unwrap();
        assert!(page.html.contains(BACKGROUND_SHIM));
    }

    #[test]
    fn test_inline_script_externalized_and_rewritten() {
        let html = "<html><head><script>var x = 1;</script></head><body></body></html>";
        let page = shim_wrap(html, PageKind::Background, None, &transformer()).unwrap();
        assert!(!page.html.contains("var x = 1;"));
        assert!(page.html.contains("inline_script_index_1.js"));
        let file = &page.extra_files[0];
        assert_eq!(file.path.display().to_string(), "inline_script_index_1.js");
        assert!(file.content.contains("var x = window[\"x\"] = 1"));
        assert!(file.content.starts_with("opera.isReady"));
    }

    #[test]
    fn test_external_script_tags_untouched() {
        let html = r#"<html><head><script src="app.js"></script></head></html>"#;
        let page = shim_wrap(html, PageKind::Other, None, &transformer()).unwrap();
        assert!(page.html.contains(r#"<script src="app.js"></script>"#));
        assert!(page.extra_files.is_empty());
    }

    #[test]
    fn test_prefs_exported_for_background() {
        let html = "<html><head></head></html>";
        let prefs = vec![("interval".to_string(), "30".to_string())];
        let page = shim_wrap(html, PageKind::Background, Some(&prefs), &transformer()).unwrap();
        assert!(page.html.contains("exported_prefs.js"));
        let prefs_file = page
            .extra_files
            .iter()
            .find(|f| f.path.display().to_string() == "exported_prefs.js")
            .expect("exported prefs file");
        assert!(prefs_file
            .content
            .contains("widget.preferences.setItem(\"interval\", \"30\");"));
        assert!(prefs_file.content.contains("_OPERA_INTERNAL_defaultPrefsSet"));
    }

    #[test]
    fn test_headless_document_still_shimmed() {
        let html = "<p>bare</p>";
        let page = shim_wrap(html, PageKind::Other, None, &transformer()).unwrap();
        assert!(page.html.starts_with("<script"));
        assert!(page.html.contains("<p>bare</p>"));
    }
}
