//! Source extension representation

use super::config::WidgetConfig;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A loaded source package: parsed configuration plus every file's bytes.
#[derive(Debug, Clone)]
pub struct Extension {
    pub config: WidgetConfig,
    pub files: HashMap<PathBuf, Vec<u8>>,
    pub metadata: ExtensionMetadata,
}

#[derive(Debug, Clone)]
pub struct ExtensionMetadata {
    pub name: String,
    pub version: String,
    pub file_count: usize,
}

impl Extension {
    pub fn new(config: WidgetConfig, files: HashMap<PathBuf, Vec<u8>>) -> Self {
        let metadata = ExtensionMetadata {
            name: config
                .name
                .clone()
                .unwrap_or_else(|| "Unnamed extension".to_string()),
            version: config.version.clone(),
            file_count: files.len(),
        };
        Self {
            config,
            files,
            metadata,
        }
    }

    pub fn get_file_content(&self, path: &Path) -> Option<&[u8]> {
        self.files.get(path).map(|bytes| bytes.as_slice())
    }

    /// Every .js file in the package, sorted for deterministic output.
    pub fn script_files(&self) -> Vec<PathBuf> {
        let mut scripts: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|p| has_extension(p, &["js"]))
            .cloned()
            .collect();
        scripts.sort();
        scripts
    }

    /// User scripts under includes/, injected into matching pages.
    pub fn injected_script_files(&self) -> Vec<PathBuf> {
        let mut scripts: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|p| p.starts_with("includes") && has_extension(p, &["js"]))
            .cloned()
            .collect();
        scripts.sort();
        scripts
    }

    pub fn html_files(&self) -> Vec<PathBuf> {
        let mut pages: Vec<PathBuf> = self
            .files
            .keys()
            .filter(|p| has_extension(p, &["html", "htm", "xhtml", "xhtm"]))
            .cloned()
            .collect();
        pages.sort();
        pages
    }
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}
