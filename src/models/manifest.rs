//! Target manifest.json model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Content security policy applied to every converted package; the runtime
/// shim relies on eval.
pub const DEFAULT_CSP: &str = "script-src 'self' 'unsafe-eval'; object-src 'unsafe-eval';";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Manifest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub developer: Option<Developer>,

    pub description: String,
    pub manifest_version: u32,
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<Background>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub icons: Option<BTreeMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub browser_action: Option<BrowserAction>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options_page: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_locale: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub content_scripts: Vec<ContentScript>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub web_accessible_resources: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub permissions: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub speeddial: Option<Speeddial>,

    pub content_security_policy: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Developer {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Background {
    pub page: String,
}

/// Serialized as an empty object; the runtime shim wires up popup and icon.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BrowserAction {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentScript {
    pub js: Vec<String>,
    pub matches: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub include_globs: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub exclude_globs: Vec<String>,

    pub run_at: String,
    pub all_frames: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Speeddial {
    pub url: String,
}

impl Manifest {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_sections_omitted() {
        let manifest = Manifest {
            name: "Test".to_string(),
            description: "d".to_string(),
            manifest_version: 2,
            version: "1.0".to_string(),
            content_security_policy: DEFAULT_CSP.to_string(),
            ..Manifest::default()
        };
        let json = manifest.to_json().unwrap();
        assert!(!json.contains("browser_action"));
        assert!(!json.contains("content_scripts"));
        assert!(!json.contains("speeddial"));
    }

    #[test]
    fn test_browser_action_is_empty_object() {
        let manifest = Manifest {
            browser_action: Some(BrowserAction::default()),
            ..Manifest::default()
        };
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(json.contains("\"browser_action\":{}"));
    }

    #[test]
    fn test_roundtrip() {
        let manifest = Manifest {
            name: "Test".to_string(),
            description: "d".to_string(),
            manifest_version: 2,
            version: "1.0.0.1".to_string(),
            background: Some(Background {
                page: "index.html".to_string(),
            }),
            permissions: vec!["tabs".to_string()],
            content_security_policy: DEFAULT_CSP.to_string(),
            ..Manifest::default()
        };
        let json = manifest.to_json().unwrap();
        let parsed: Manifest = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.background.unwrap().page, "index.html");
        assert_eq!(parsed.permissions, vec!["tabs"]);
    }
}
