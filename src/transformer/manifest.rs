//! Manifest generation
//!
//! Assembles the target manifest.json from the parsed widget config, the
//! accumulated permissions and the flags the file transforms produced.

use crate::models::{
    Background, BrowserAction, ContentScript, Developer, Manifest, PermissionSet, Speeddial,
    WidgetConfig, DEFAULT_CSP,
};
use crate::parser::userscript::UserScriptGlobs;
use crate::transformer::shims::INJECTED_SCRIPT_SHIM;

/// One includes/ script and its page globs.
#[derive(Debug, Clone)]
pub struct InjectedScriptEntry {
    pub file: String,
    pub globs: UserScriptGlobs,
}

/// Everything the file transforms feed into manifest generation.
#[derive(Debug, Clone, Default)]
pub struct ManifestInputs {
    pub permissions: PermissionSet,
    pub has_button: bool,
    pub has_popup: bool,
    pub has_options: bool,
    pub injected_scripts: Vec<InjectedScriptEntry>,
    pub web_accessible_resources: Vec<String>,
    /// True when the config's defaultlocale has a matching
    /// _locales/<locale>/messages.json in the package.
    pub locale_verified: bool,
}

pub struct ManifestBuilder<'a> {
    config: &'a WidgetConfig,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(config: &'a WidgetConfig) -> Self {
        Self { config }
    }

    /// Build the manifest plus a human-readable list of the notable entries,
    /// for the conversion report.
    pub fn build(&self, mut inputs: ManifestInputs) -> (Manifest, Vec<String>) {
        let config = self.config;
        let mut entries = Vec::new();

        inputs.permissions.merge_features(config.feature_names());

        let speeddial = config.speeddial_url().map(|url| Speeddial {
            url: url.to_string(),
        });
        if speeddial.is_some() {
            entries.push("Declared speeddial entry".to_string());
        }

        // A speed dial extension cannot also have a browser action.
        let browser_action = if speeddial.is_none() && (inputs.has_popup || inputs.has_button) {
            entries.push("Declared browser_action for the toolbar button".to_string());
            Some(BrowserAction::default())
        } else {
            None
        };

        let content_scripts: Vec<ContentScript> = inputs
            .injected_scripts
            .iter()
            .map(|entry| ContentScript {
                js: vec![INJECTED_SCRIPT_SHIM.to_string(), entry.file.clone()],
                matches: vec!["<all_urls>".to_string()],
                include_globs: entry.globs.includes.clone(),
                exclude_globs: entry.globs.excludes.clone(),
                run_at: "document_start".to_string(),
                all_frames: true,
            })
            .collect();
        if !content_scripts.is_empty() {
            entries.push(format!(
                "Declared {} content script entr{}",
                content_scripts.len(),
                if content_scripts.len() == 1 { "y" } else { "ies" }
            ));
        }

        let manifest = Manifest {
            name: config
                .name
                .clone()
                .unwrap_or_else(|| "Converted Opera extension".to_string()),
            developer: config.author.as_ref().map(|author| Developer {
                name: author.name.clone(),
                url: author.href.clone().unwrap_or_default(),
            }),
            description: config.description.clone().unwrap_or_default(),
            manifest_version: 2,
            version: config.version.clone(),
            background: Some(Background {
                page: config.index_document().to_string(),
            }),
            icons: if config.icons.is_empty() {
                None
            } else {
                Some(config.icons.clone())
            },
            browser_action,
            options_page: inputs
                .has_options
                .then(|| crate::models::OPTIONS_DOC.to_string()),
            default_locale: if inputs.locale_verified {
                config.default_locale.clone()
            } else {
                None
            },
            content_scripts,
            web_accessible_resources: inputs.web_accessible_resources,
            permissions: inputs.permissions.tokens().to_vec(),
            speeddial,
            content_security_policy: DEFAULT_CSP.to_string(),
        };

        entries.push(format!(
            "Granted permissions: {}",
            manifest.permissions.join(", ")
        ));

        (manifest, entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Feature;

    fn config() -> WidgetConfig {
        WidgetConfig {
            name: Some("Test".to_string()),
            description: Some("desc".to_string()),
            version: "1.0".to_string(),
            ..WidgetConfig::default()
        }
    }

    #[test]
    fn test_basic_manifest() {
        let config = config();
        let (manifest, _) = ManifestBuilder::new(&config).build(ManifestInputs {
            permissions: PermissionSet::with_defaults(),
            ..ManifestInputs::default()
        });
        assert_eq!(manifest.name, "Test");
        assert_eq!(manifest.manifest_version, 2);
        assert_eq!(manifest.background.unwrap().page, "index.html");
        assert!(manifest.browser_action.is_none());
        assert!(manifest.permissions.contains(&"storage".to_string()));
        assert_eq!(manifest.content_security_policy, DEFAULT_CSP);
    }

    #[test]
    fn test_button_declares_browser_action() {
        let config = config();
        let (manifest, entries) = ManifestBuilder::new(&config).build(ManifestInputs {
            has_button: true,
            ..ManifestInputs::default()
        });
        assert!(manifest.browser_action.is_some());
        assert!(entries.iter().any(|e| e.contains("browser_action")));
    }

    #[test]
    fn test_speeddial_suppresses_browser_action() {
        let mut config = config();
        config.features.push(Feature {
            name: "opera:speeddial".to_string(),
            params: vec![("value".to_string(), "https://example.com".to_string())],
        });
        let (manifest, _) = ManifestBuilder::new(&config).build(ManifestInputs {
            has_button: true,
            has_popup: true,
            ..ManifestInputs::default()
        });
        assert!(manifest.browser_action.is_none());
        assert_eq!(manifest.speeddial.unwrap().url, "https://example.com");
    }

    #[test]
    fn test_feature_permissions_merged() {
        let mut config = config();
        config.features.push(Feature {
            name: "opera:contextmenus".to_string(),
            params: Vec::new(),
        });
        let (manifest, _) = ManifestBuilder::new(&config).build(ManifestInputs::default());
        assert!(manifest.permissions.contains(&"contextMenus".to_string()));
    }

    #[test]
    fn test_content_scripts_lead_with_shim() {
        let config = config();
        let (manifest, _) = ManifestBuilder::new(&config).build(ManifestInputs {
            injected_scripts: vec![InjectedScriptEntry {
                file: "includes/inject.js".to_string(),
                globs: UserScriptGlobs {
                    includes: vec!["*".to_string()],
                    excludes: Vec::new(),
                },
            }],
            ..ManifestInputs::default()
        });
        assert_eq!(manifest.content_scripts.len(), 1);
        let script = &manifest.content_scripts[0];
        assert_eq!(script.js[0], INJECTED_SCRIPT_SHIM);
        assert_eq!(script.js[1], "includes/inject.js");
        assert_eq!(script.run_at, "document_start");
        assert!(script.all_frames);
    }

    #[test]
    fn test_unverified_locale_dropped() {
        let mut config = config();
        config.default_locale = Some("en".to_string());
        let (manifest, _) = ManifestBuilder::new(&config).build(ManifestInputs::default());
        assert!(manifest.default_locale.is_none());
    }
}
