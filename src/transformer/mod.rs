//! Transformation pipeline: rewrite every file and assemble the manifest

pub mod html;
pub mod javascript;
pub mod manifest;
pub mod shims;

pub use javascript::ScriptTransformer;
pub use manifest::{InjectedScriptEntry, ManifestBuilder, ManifestInputs};

use std::path::{Path, PathBuf};

use crate::error::PackageError;
use crate::models::{
    ChangeType, ConversionContext, ConversionReport, ConversionResult, FileChange, ModifiedFile,
    ReportSummary, OPTIONS_DOC, POPUP_DOC,
};
use crate::parser::parse_userscript_prolog;
use crate::rewriter::RewriteOptions;
use crate::utils::decode_text;
use crate::ConversionOptions;
use html::{shim_wrap, PageKind};

/// Main transformation entry point. Consumes the analyzed context and
/// produces the rewritten file set plus the generated manifest.
pub fn transform_extension(
    mut context: ConversionContext,
    options: &ConversionOptions,
) -> Result<ConversionResult, PackageError> {
    let rewrite_options = RewriteOptions {
        function_export: options.function_export,
        ..RewriteOptions::default()
    };
    let scripts = ScriptTransformer::new(rewrite_options, options.parse_mode);

    let mut modified_files: Vec<ModifiedFile> = Vec::new();
    let mut new_files = Vec::new();
    let mut javascript_changes = Vec::new();
    let mut injected_scripts = Vec::new();
    let mut scripts_rewritten = 0;
    let mut has_popup = false;
    let mut has_options = false;

    let index_doc = context.source.config.index_document().to_string();

    // 1. Standalone scripts (background libraries and includes/ user scripts)
    for path in context.source.script_files() {
        let Some(bytes) = context.source.get_file_content(&path).map(<[u8]>::to_vec) else {
            continue;
        };
        let source_text = decode_text(&bytes);
        let transformed = scripts.transform_source(&source_text, &path)?;

        for warning in &transformed.warnings {
            context.add_warning(warning.clone(), Some(path.display().to_string()));
        }
        context
            .permissions
            .extend_hints(transformed.permission_hints.iter().copied());
        context.has_button |= transformed.has_button;

        if path.starts_with("includes") {
            injected_scripts.push(InjectedScriptEntry {
                file: path_string(&path),
                globs: parse_userscript_prolog(&source_text),
            });
        }

        if transformed.text != source_text {
            scripts_rewritten += 1;
            javascript_changes.push(format!("{}: rewritten for the runtime shim", path.display()));
            modified_files.push(ModifiedFile {
                path: path.clone(),
                original_content: source_text,
                new_content: transformed.text,
                changes: vec![FileChange {
                    change_type: ChangeType::Modification,
                    description: "exported globals and wrapped for the runtime shim".to_string(),
                }],
            });
        }
    }

    // 2. HTML pages
    for path in context.source.html_files() {
        let Some(bytes) = context.source.get_file_content(&path).map(<[u8]>::to_vec) else {
            continue;
        };
        let source_text = decode_text(&bytes);
        let kind = page_kind(&path, &index_doc);
        match kind {
            PageKind::Popup => has_popup = true,
            PageKind::Options => has_options = true,
            _ => {}
        }

        let prefs = (kind == PageKind::Background && !context.source.config.preferences.is_empty())
            .then(|| context.source.config.preferences.clone());
        let page = shim_wrap(&source_text, kind, prefs.as_deref(), &scripts)?;

        for warning in &page.warnings {
            context.add_warning(warning.clone(), Some(path.display().to_string()));
        }
        context
            .permissions
            .extend_hints(page.permission_hints.iter().copied());
        context.has_button |= page.has_button;

        javascript_changes.extend(
            page.extra_files
                .iter()
                .map(|f| format!("{}: {}", f.path.display(), f.purpose)),
        );
        new_files.extend(page.extra_files);
        modified_files.push(ModifiedFile {
            path: path.clone(),
            original_content: source_text,
            new_content: page.html,
            changes: vec![FileChange {
                change_type: ChangeType::Modification,
                description: "injected runtime shim and externalized inline scripts".to_string(),
            }],
        });
    }

    // 3. Shim files
    new_files.push(shims::background_shim_file());
    if modified_files
        .iter()
        .any(|f| page_kind(&f.path, &index_doc) != PageKind::Background && is_html(&f.path))
    {
        new_files.push(shims::anypage_shim_file());
    }
    if !injected_scripts.is_empty() {
        new_files.push(shims::injected_script_shim_file());
    }
    new_files.extend(shims::resource_loader_files());

    // 4. Manifest
    let locale_verified = context
        .source
        .config
        .default_locale
        .as_deref()
        .map(|locale| {
            context
                .source
                .files
                .contains_key(&PathBuf::from(format!("_locales/{}/messages.json", locale)))
        })
        .unwrap_or(false);

    let inputs = ManifestInputs {
        permissions: context.permissions.clone(),
        has_button: context.has_button,
        has_popup,
        has_options,
        injected_scripts,
        web_accessible_resources: web_accessible(&context, &index_doc),
        locale_verified,
    };
    let (manifest, manifest_entries) = ManifestBuilder::new(&context.source.config).build(inputs);

    // 5. Report
    let report = ConversionReport {
        summary: ReportSummary {
            extension_name: context.source.metadata.name.clone(),
            extension_version: context.source.metadata.version.clone(),
            conversion_successful: !context.has_blockers(),
            files_modified: modified_files.len(),
            files_added: new_files.len(),
            scripts_rewritten,
            permissions_granted: manifest.permissions.len(),
        },
        manifest_entries,
        javascript_changes,
        warnings: context.warnings.iter().map(|w| w.message.clone()).collect(),
    };

    Ok(ConversionResult {
        source: context.source,
        manifest,
        modified_files,
        new_files,
        report,
    })
}

fn page_kind(path: &Path, index_doc: &str) -> PageKind {
    let name = path_string(path);
    if name == index_doc {
        PageKind::Background
    } else if name == POPUP_DOC {
        PageKind::Popup
    } else if name == OPTIONS_DOC {
        PageKind::Options
    } else {
        PageKind::Other
    }
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "html" | "htm" | "xhtml" | "xhtm"))
        .unwrap_or(false)
}

/// Everything except the config and the shim-wrapped documents stays
/// reachable from web pages.
fn web_accessible(context: &ConversionContext, index_doc: &str) -> Vec<String> {
    let mut resources: Vec<String> = context
        .source
        .files
        .keys()
        .map(|p| path_string(p))
        .filter(|name| {
            name != "config.xml" && name != index_doc && name != POPUP_DOC && name != OPTIONS_DOC
        })
        .collect();
    resources.sort();
    resources
}

fn path_string(path: &Path) -> String {
    // zip member names always use forward slashes
    path.to_string_lossy().replace('\\', "/")
}
