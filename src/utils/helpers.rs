//! Helper utility functions

use lazy_static::lazy_static;
use regex::Regex;

/// Decode package text bytes with an explicit fallback list: UTF-8 (BOM
/// tolerated), UTF-16 when a BOM announces it, then Latin-1, which cannot
/// fail. Tried in order rather than driven by decode errors.
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some(stripped) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        if let Ok(text) = std::str::from_utf8(stripped) {
            return text.to_string();
        }
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return decode_utf16(&bytes[2..], u16::from_le_bytes);
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return decode_utf16(&bytes[2..], u16::from_be_bytes);
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    // Latin-1: every byte maps to the code point of the same value
    bytes.iter().map(|&b| b as char).collect()
}

fn decode_utf16(bytes: &[u8], read: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| read([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

/// Clean up a config.xml `version` attribute and validate it against the
/// package requirements: 1-4 dot-separated integers, each 0..=65536. Falls
/// back to "1.0.0.1".
pub fn normalize_version(version: &str) -> String {
    lazy_static! {
        static ref NON_VERSION: Regex = Regex::new(r"[^\d.]+").unwrap();
    }
    let cleaned = NON_VERSION.replace_all(version, ".");
    let cleaned = cleaned.trim_matches('.');

    let parts: Vec<&str> = cleaned.split('.').collect();
    let valid = !cleaned.is_empty()
        && parts.len() <= 4
        && parts.iter().all(|part| {
            !part.is_empty()
                && part
                    .parse::<u32>()
                    .map(|number| number <= 65536)
                    .unwrap_or(false)
        });

    if valid {
        cleaned.to_string()
    } else {
        "1.0.0.1".to_string()
    }
}

/// The package-root path a localized English resource shadows:
/// `locales/en/foo.js` -> `foo.js`. Returns `None` for anything outside an
/// English locale folder.
pub fn delocalized_path(path: &str) -> Option<String> {
    lazy_static! {
        static ref EN_LOCALE: Regex = Regex::new(r"^locales/en(-[A-Za-z]{2})?/").unwrap();
    }
    let stripped = EN_LOCALE.replace(path, "");
    if stripped != path && !stripped.is_empty() {
        Some(stripped.into_owned())
    } else {
        None
    }
}
