//! Output structure validation
//!
//! Sanity checks over the assembled output before anything touches disk:
//! the manifest must serialize and every file it references must exist in
//! the output set.

use crate::error::PackageError;
use crate::models::{ConversionResult, Manifest};
use crate::packager::assemble_output;

pub fn validate_result(result: &ConversionResult) -> Result<(), PackageError> {
    let manifest_json = result
        .manifest
        .to_json()
        .map_err(|e| PackageError::InvalidPackage(format!("manifest failed to serialize: {}", e)))?;
    serde_json::from_str::<Manifest>(&manifest_json)
        .map_err(|e| PackageError::InvalidPackage(format!("generated manifest is invalid: {}", e)))?;

    let output = assemble_output(result);
    let mut missing = Vec::new();

    if let Some(background) = &result.manifest.background {
        if !output.contains_key(&background.page) {
            missing.push(background.page.clone());
        }
    }
    for script in &result.manifest.content_scripts {
        for js in &script.js {
            if !output.contains_key(js) {
                missing.push(js.clone());
            }
        }
    }
    if let Some(icons) = &result.manifest.icons {
        for path in icons.values() {
            if !output.contains_key(path) {
                missing.push(path.clone());
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PackageError::InvalidPackage(format!(
            "manifest references files missing from the output: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Background, ConversionReport, Extension, NewFile, WidgetConfig, DEFAULT_CSP,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn result(files: &[(&str, &str)], background: Option<&str>) -> ConversionResult {
        let map: HashMap<PathBuf, Vec<u8>> = files
            .iter()
            .map(|(p, c)| (PathBuf::from(p), c.as_bytes().to_vec()))
            .collect();
        ConversionResult {
            source: Extension::new(WidgetConfig::default(), map),
            manifest: Manifest {
                name: "t".to_string(),
                description: String::new(),
                manifest_version: 2,
                version: "1.0".to_string(),
                background: background.map(|page| Background {
                    page: page.to_string(),
                }),
                content_security_policy: DEFAULT_CSP.to_string(),
                ..Manifest::default()
            },
            modified_files: Vec::new(),
            new_files: vec![NewFile {
                path: PathBuf::from("oex_shim/shim.js"),
                content: String::new(),
                purpose: "shim".to_string(),
            }],
            report: ConversionReport::default(),
        }
    }

    #[test]
    fn test_valid_result_passes() {
        let result = result(&[("index.html", "<html></html>")], Some("index.html"));
        assert!(validate_result(&result).is_ok());
    }

    #[test]
    fn test_missing_background_page_fails() {
        let result = result(&[], Some("index.html"));
        assert!(matches!(
            validate_result(&result),
            Err(PackageError::InvalidPackage(_))
        ));
    }
}
