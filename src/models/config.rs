//! Widget configuration model parsed from config.xml

use std::collections::BTreeMap;

/// Default background document when the config carries no `<content>` element.
pub const DEFAULT_INDEX_DOC: &str = "index.html";
/// Toolbar popup document, conventionally added by the background process.
pub const POPUP_DOC: &str = "popup.html";
/// Preferences/options document.
pub const OPTIONS_DOC: &str = "options.html";

/// Metadata extracted from a W3C widget `config.xml`.
#[derive(Debug, Clone, Default)]
pub struct WidgetConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Normalized to 1-4 dot-separated integers.
    pub version: String,
    pub author: Option<Author>,
    /// `<content src>` if present.
    pub content_src: Option<String>,
    /// Icon size ("16"/"48"/"128") to package path.
    pub icons: BTreeMap<String, String>,
    pub access_origins: Vec<AccessOrigin>,
    pub features: Vec<Feature>,
    /// `<preference name value>` pairs in document order.
    pub preferences: Vec<(String, String)>,
    /// `defaultlocale` attribute, unvalidated against the package contents.
    pub default_locale: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Author {
    pub name: String,
    pub href: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AccessOrigin {
    pub origin: String,
    pub subdomains: bool,
}

#[derive(Debug, Clone)]
pub struct Feature {
    pub name: String,
    /// `<param name value>` children.
    pub params: Vec<(String, String)>,
}

impl WidgetConfig {
    /// The background document driving the extension.
    pub fn index_document(&self) -> &str {
        self.content_src.as_deref().unwrap_or(DEFAULT_INDEX_DOC)
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    /// The speed dial target URL, when this is a speed dial extension. A
    /// `opera:speeddial` feature without a URL param is invalid and yields
    /// `None`.
    pub fn speeddial_url(&self) -> Option<&str> {
        self.features
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case("opera:speeddial"))
            .and_then(|f| {
                f.params
                    .iter()
                    .find(|(name, _)| name == "value")
                    .map(|(_, value)| value.as_str())
            })
    }

    pub fn has_speeddial_feature(&self) -> bool {
        self.features
            .iter()
            .any(|f| f.name.eq_ignore_ascii_case("opera:speeddial"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_document_default() {
        let config = WidgetConfig::default();
        assert_eq!(config.index_document(), "index.html");
    }

    #[test]
    fn test_speeddial_url_requires_param() {
        let mut config = WidgetConfig::default();
        config.features.push(Feature {
            name: "opera:speeddial".to_string(),
            params: Vec::new(),
        });
        assert!(config.has_speeddial_feature());
        assert_eq!(config.speeddial_url(), None);

        config.features[0]
            .params
            .push(("value".to_string(), "https://example.com".to_string()));
        assert_eq!(config.speeddial_url(), Some("https://example.com"));
    }
}
