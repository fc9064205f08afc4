//! Conversion context and results

use super::{Extension, Incompatibility, Manifest, PermissionSet};
use std::path::PathBuf;

/// Mutable state threaded through analysis and transformation. Owns the
/// permission accumulator so nothing about a conversion is process-global.
#[derive(Debug, Clone)]
pub struct ConversionContext {
    pub source: Extension,
    pub incompatibilities: Vec<Incompatibility>,
    pub warnings: Vec<Warning>,
    pub permissions: PermissionSet,
    pub has_button: bool,
}

#[derive(Debug, Clone)]
pub struct Warning {
    pub message: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub source: Extension,
    pub manifest: Manifest,
    pub modified_files: Vec<ModifiedFile>,
    pub new_files: Vec<NewFile>,
    pub report: ConversionReport,
}

/// A text file whose content was rewritten during conversion.
#[derive(Debug, Clone)]
pub struct ModifiedFile {
    pub path: PathBuf,
    pub original_content: String,
    pub new_content: String,
    pub changes: Vec<FileChange>,
}

/// A file added to the output that has no source counterpart (shims,
/// extracted inline scripts, exported preferences).
#[derive(Debug, Clone)]
pub struct NewFile {
    pub path: PathBuf,
    pub content: String,
    pub purpose: String,
}

#[derive(Debug, Clone)]
pub struct FileChange {
    pub change_type: ChangeType,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeType {
    Addition,
    Modification,
}

#[derive(Debug, Clone, Default)]
pub struct ConversionReport {
    pub summary: ReportSummary,
    pub manifest_entries: Vec<String>,
    pub javascript_changes: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReportSummary {
    pub extension_name: String,
    pub extension_version: String,
    pub conversion_successful: bool,
    pub files_modified: usize,
    pub files_added: usize,
    pub scripts_rewritten: usize,
    pub permissions_granted: usize,
}

impl ConversionContext {
    pub fn new(extension: Extension) -> Self {
        Self {
            source: extension,
            incompatibilities: Vec::new(),
            warnings: Vec::new(),
            permissions: PermissionSet::with_defaults(),
            has_button: false,
        }
    }

    pub fn add_incompatibility(&mut self, incompatibility: Incompatibility) {
        self.incompatibilities.push(incompatibility);
    }

    pub fn add_warning(&mut self, message: impl Into<String>, location: Option<String>) {
        self.warnings.push(Warning {
            message: message.into(),
            location,
        });
    }

    pub fn has_blockers(&self) -> bool {
        self.incompatibilities
            .iter()
            .any(|i| matches!(i.severity, super::incompatibility::Severity::Blocker))
    }
}
