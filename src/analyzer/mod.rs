//! Pre-transform analysis
//!
//! Inspects a loaded package before anything is rewritten: configuration
//! completeness, speed dial validity, feature support and a parse probe over
//! every script. Findings land on the conversion context as
//! incompatibilities and warnings; none of them mutate the package.

use crate::error::PackageError;
use crate::models::{
    ConversionContext, Extension, Incompatibility, IncompatibilityCategory, Location, Severity,
};
use crate::rewriter::ScriptRewriter;
use crate::utils::decode_text;
use std::path::PathBuf;

pub fn analyze_extension(extension: Extension) -> Result<ConversionContext, PackageError> {
    let mut context = ConversionContext::new(extension);

    analyze_config(&mut context);
    analyze_features(&mut context);
    analyze_scripts(&mut context);
    analyze_locales(&mut context);

    Ok(context)
}

fn analyze_config(context: &mut ConversionContext) {
    let config = context.source.config.clone();

    if config.name.is_none() {
        context.add_incompatibility(
            Incompatibility::new(
                Severity::Minor,
                IncompatibilityCategory::ConfigStructure,
                Location::ConfigField("name".to_string()),
                "No name found in config.xml",
            )
            .with_suggestion("A placeholder name will be used in the manifest")
            .auto_fixable(),
        );
    }

    let index = PathBuf::from(config.index_document());
    if !context.source.files.contains_key(&index) {
        context.add_incompatibility(Incompatibility::new(
            Severity::Major,
            IncompatibilityCategory::ConfigStructure,
            Location::ConfigField("content".to_string()),
            format!(
                "background document {} is not present in the package",
                index.display()
            ),
        ));
    }
}

fn analyze_features(context: &mut ConversionContext) {
    let config = context.source.config.clone();

    if config.has_speeddial_feature() && config.speeddial_url().is_none() {
        context.add_warning(
            "Invalid speed dial extension: feature element lacks a param element or URL.",
            Some("config.xml".to_string()),
        );
        context.add_incompatibility(Incompatibility::new(
            Severity::Major,
            IncompatibilityCategory::SpeedDial,
            Location::Config,
            "opera:speeddial feature without a URL param",
        ));
    }

    for name in config.feature_names() {
        let known = matches!(
            name,
            "opera:contextmenus" | "opera:share-cookies" | "opera:speeddial"
        );
        if name.starts_with("opera:") && !known {
            context.add_incompatibility(Incompatibility::new(
                Severity::Info,
                IncompatibilityCategory::UnsupportedFeature,
                Location::Config,
                format!("feature {} has no converted equivalent", name),
            ));
        }
    }
}

/// Probe each script for parseability so problems surface before the
/// rewrite pass. JSON data files with a .js name are fine.
fn analyze_scripts(context: &mut ConversionContext) {
    let rewriter = ScriptRewriter::new();
    for path in context.source.script_files() {
        let Some(bytes) = context.source.get_file_content(&path).map(<[u8]>::to_vec) else {
            continue;
        };
        let source = decode_text(&bytes);
        if rewriter.parse(&source).is_err()
            && serde_json::from_str::<serde_json::Value>(&source).is_err()
        {
            context.add_incompatibility(
                Incompatibility::new(
                    Severity::Minor,
                    IncompatibilityCategory::ScriptParse,
                    Location::File(path.clone()),
                    "script could not be parsed",
                )
                .with_suggestion("The file will be passed through unmodified"),
            );
        }
    }
}

fn analyze_locales(context: &mut ConversionContext) {
    let Some(locale) = context.source.config.default_locale.clone() else {
        return;
    };
    let messages = PathBuf::from(format!("_locales/{}/messages.json", locale));
    if !context.source.files.contains_key(&messages) {
        context.add_incompatibility(Incompatibility::new(
            Severity::Info,
            IncompatibilityCategory::LocaleStructure,
            Location::ConfigField("defaultlocale".to_string()),
            format!(
                "no {} in the package; the default locale will be ignored",
                messages.display()
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Feature, WidgetConfig};
    use std::collections::HashMap;

    fn extension(config: WidgetConfig, files: &[(&str, &str)]) -> Extension {
        let map: HashMap<PathBuf, Vec<u8>> = files
            .iter()
            .map(|(p, c)| (PathBuf::from(p), c.as_bytes().to_vec()))
            .collect();
        Extension::new(config, map)
    }

    #[test]
    fn test_missing_name_flagged() {
        let context = analyze_extension(extension(
            WidgetConfig::default(),
            &[("index.html", "<html></html>")],
        ))
        .unwrap();
        assert!(context
            .incompatibilities
            .iter()
            .any(|i| i.category == IncompatibilityCategory::ConfigStructure
                && matches!(&i.location, Location::ConfigField(f) if f == "name")));
    }

    #[test]
    fn test_missing_background_document_is_major() {
        let context = analyze_extension(extension(WidgetConfig::default(), &[])).unwrap();
        assert!(context
            .incompatibilities
            .iter()
            .any(|i| i.severity == Severity::Major));
    }

    #[test]
    fn test_invalid_speeddial_warns() {
        let mut config = WidgetConfig::default();
        config.features.push(Feature {
            name: "opera:speeddial".to_string(),
            params: Vec::new(),
        });
        let context =
            analyze_extension(extension(config, &[("index.html", "<html></html>")])).unwrap();
        assert!(context
            .warnings
            .iter()
            .any(|w| w.message.contains("speed dial")));
    }

    #[test]
    fn test_unparseable_script_flagged_but_not_blocking() {
        let context = analyze_extension(extension(
            WidgetConfig::default(),
            &[("index.html", "<html></html>"), ("broken.js", "var = (")],
        ))
        .unwrap();
        assert!(context
            .incompatibilities
            .iter()
            .any(|i| i.category == IncompatibilityCategory::ScriptParse));
        assert!(!context.has_blockers());
    }

    #[test]
    fn test_json_data_file_not_flagged() {
        let context = analyze_extension(extension(
            WidgetConfig::default(),
            &[("index.html", "<html></html>"), ("data.js", "{\"a\": 1}")],
        ))
        .unwrap();
        assert!(!context
            .incompatibilities
            .iter()
            .any(|i| i.category == IncompatibilityCategory::ScriptParse));
    }
}
