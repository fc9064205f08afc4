//! config.xml parsing
//!
//! Reads the W3C widget configuration that drives manifest generation:
//! localized name/description, version, author, content entry point, icons,
//! access origins, feature elements and the preference store.

use lazy_static::lazy_static;
use regex::Regex;
use roxmltree::{Document, Node};
use std::collections::BTreeMap;

use crate::error::PackageError;
use crate::models::{AccessOrigin, Author, Feature, WidgetConfig};
use crate::utils::normalize_version;

const WIDGET_NS: &str = "http://www.w3.org/ns/widgets";
const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

pub fn parse_config(xml: &str) -> Result<WidgetConfig, PackageError> {
    let document = Document::parse(xml).map_err(|e| {
        PackageError::InvalidPackage(format!("parsing config.xml failed with: {}", e))
    })?;
    let root = document.root_element();

    let version = root
        .attribute("version")
        .map(normalize_version)
        .unwrap_or_else(|| "1.0.0.1".to_string());

    let mut config = WidgetConfig {
        name: best_localized_text(root, "name"),
        description: best_localized_text(root, "description"),
        version,
        author: parse_author(root),
        content_src: widget_children(root, "content")
            .next()
            .and_then(|n| n.attribute("src"))
            .map(str::to_string),
        icons: select_icons(root),
        access_origins: parse_access(root),
        features: parse_features(root),
        preferences: parse_preferences(root),
        default_locale: root
            .attribute("defaultlocale")
            .filter(|l| !l.is_empty())
            .map(str::to_string),
    };

    // icon paths are package-relative; strip any leading slash
    config.icons = config
        .icons
        .into_iter()
        .map(|(size, path)| (size, path.trim_start_matches('/').to_string()))
        .collect();

    Ok(config)
}

fn widget_children<'a>(root: Node<'a, 'a>, tag: &'a str) -> impl Iterator<Item = Node<'a, 'a>> {
    root.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
        .filter(|n| {
            n.tag_name().namespace().is_none() || n.tag_name().namespace() == Some(WIDGET_NS)
        })
}

/// Pick the best text content among localized variants of `tag`: an element
/// without `xml:lang` wins outright, otherwise the first `en` variant,
/// otherwise the first one seen.
fn best_localized_text(root: Node, tag: &str) -> Option<String> {
    let mut best: Option<String> = None;
    for node in widget_children(root, tag) {
        let text = node.text().map(str::trim).unwrap_or("").to_string();
        match node.attribute((XML_NS, "lang")) {
            None => return non_empty(text),
            Some(lang) => {
                if best.is_none() || lang.contains("en") {
                    best = non_empty(text).or(best);
                }
            }
        }
    }
    best
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn parse_author(root: Node) -> Option<Author> {
    let node = widget_children(root, "author").next()?;
    let name = node.text().map(str::trim).unwrap_or("").to_string();
    if name.is_empty() {
        return None;
    }
    Some(Author {
        name,
        href: node.attribute("href").map(str::to_string),
    })
}

fn parse_access(root: Node) -> Vec<AccessOrigin> {
    widget_children(root, "access")
        .filter_map(|node| {
            node.attribute("origin").map(|origin| AccessOrigin {
                origin: origin.to_string(),
                subdomains: node.attribute("subdomains") == Some("true"),
            })
        })
        .collect()
}

fn parse_features(root: Node) -> Vec<Feature> {
    widget_children(root, "feature")
        .filter_map(|node| {
            let name = node.attribute("name")?;
            let params = node
                .children()
                .filter(|c| c.is_element() && c.tag_name().name() == "param")
                .filter_map(|param| {
                    Some((
                        param.attribute("name")?.to_string(),
                        param.attribute("value")?.to_string(),
                    ))
                })
                .collect();
            Some(Feature {
                name: name.to_string(),
                params,
            })
        })
        .collect()
}

fn parse_preferences(root: Node) -> Vec<(String, String)> {
    widget_children(root, "preference")
        .filter_map(|node| {
            Some((
                node.attribute("name")?.to_string(),
                node.attribute("value").unwrap_or("").to_string(),
            ))
        })
        .collect()
}

/// Icon selection: with several `<icon>` elements, keep those with an
/// explicit 16/48/128 width, fall back to sniffing a size out of the file
/// name, and otherwise slot the leftover in as the 128px icon. A single icon
/// is taken as the 128px icon.
fn select_icons(root: Node) -> BTreeMap<String, String> {
    lazy_static! {
        static ref ICON_SIZE: Regex = Regex::new(r"16|48|128").unwrap();
    }
    let elements: Vec<Node> = widget_children(root, "icon").collect();
    let mut icons = BTreeMap::new();

    if elements.len() > 1 {
        for icon in &elements {
            let Some(src) = icon.attribute("src") else {
                continue;
            };
            let width = icon.attribute("width");
            if let Some(width) = width.filter(|w| ["16", "48", "128"].contains(w)) {
                icons.insert(width.to_string(), src.to_string());
            } else if let Some(found) = ICON_SIZE.find(src) {
                icons.insert(found.as_str().to_string(), src.to_string());
            } else {
                icons.insert("128".to_string(), src.to_string());
            }
        }
    } else if let Some(icon) = elements.first() {
        if let Some(src) = icon.attribute("src") {
            icons.insert("128".to_string(), src.to_string());
        }
    }
    icons
}
