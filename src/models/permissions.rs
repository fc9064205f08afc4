//! Permission hints and the manifest permission accumulator

use serde::{Deserialize, Serialize};

/// A capability inferred from an API call pattern, destined for the
/// manifest's permission list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Permission {
    Tabs,
    WebRequest,
    ContextMenus,
    Cookies,
}

impl Permission {
    /// The manifest token(s) this hint expands to. `WebRequest` implies
    /// blocking as well, matching what the runtime shim registers.
    pub fn tokens(&self) -> &'static [&'static str] {
        match self {
            Permission::Tabs => &["tabs"],
            Permission::WebRequest => &["webRequest", "webRequestBlocking"],
            Permission::ContextMenus => &["contextMenus"],
            Permission::Cookies => &["cookies"],
        }
    }
}

/// Permissions granted to converted extensions before any script analysis.
/// Every widget could reach cross-origin URLs and its preference store.
pub const DEFAULT_PERMISSIONS: [&str; 3] = ["http://*/*", "https://*/*", "storage"];

/// Ordered, deduplicating accumulator for manifest permissions. One instance
/// per conversion; merged from per-file rewrite results by the caller.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet {
    entries: Vec<String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// An accumulator pre-seeded with the defaults every converted package
    /// receives.
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        for token in DEFAULT_PERMISSIONS {
            set.insert(token);
        }
        set
    }

    pub fn insert(&mut self, token: impl Into<String>) {
        let token = token.into();
        if !self.entries.contains(&token) {
            self.entries.push(token);
        }
    }

    pub fn add(&mut self, permission: Permission) {
        for token in permission.tokens() {
            self.insert(*token);
        }
    }

    pub fn extend_hints<I: IntoIterator<Item = Permission>>(&mut self, hints: I) {
        for hint in hints {
            self.add(hint);
        }
    }

    /// Merge widget `<feature>` element names into the permission list.
    pub fn merge_features<'a, I: IntoIterator<Item = &'a str>>(&mut self, features: I) {
        for feature in features {
            match feature {
                "opera:contextmenus" => self.add(Permission::ContextMenus),
                "opera:share-cookies" => self.add(Permission::Cookies),
                _ => {}
            }
        }
    }

    pub fn tokens(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_seeded() {
        let set = PermissionSet::with_defaults();
        assert_eq!(set.tokens(), &["http://*/*", "https://*/*", "storage"]);
    }

    #[test]
    fn test_add_deduplicates() {
        let mut set = PermissionSet::new();
        set.add(Permission::Tabs);
        set.add(Permission::Tabs);
        set.add(Permission::WebRequest);
        assert_eq!(set.tokens(), &["tabs", "webRequest", "webRequestBlocking"]);
    }

    #[test]
    fn test_merge_features() {
        let mut set = PermissionSet::new();
        set.merge_features(["opera:contextmenus", "opera:speeddial", "opera:share-cookies"]);
        assert_eq!(set.tokens(), &["contextMenus", "cookies"]);
    }
}
