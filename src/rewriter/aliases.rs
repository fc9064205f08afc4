//! Alias table for the fixed set of tracked global-object roles
//!
//! The rewrite engine only understands a handful of well-known globals from
//! the source API surface. Scripts routinely stash them in local variables
//! (`var w = window, o = w.opera; var prefs = w.widget.preferences;`), so the
//! walker records every such declaration here and later pattern checks test
//! membership instead of literal names.

/// Semantic category a local identifier may refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Window,
    /// The `opera` object.
    GlobalObject,
    /// The `widget` object.
    WidgetObject,
    /// `opera.extension`.
    ExtensionObject,
    /// `widget.preferences`.
    PreferencesObject,
    /// `opera.contexts.toolbar`.
    ToolbarObject,
}

pub const ROLES: [Role; 6] = [
    Role::Window,
    Role::GlobalObject,
    Role::WidgetObject,
    Role::ExtensionObject,
    Role::PreferencesObject,
    Role::ToolbarObject,
];

impl Role {
    fn index(self) -> usize {
        match self {
            Role::Window => 0,
            Role::GlobalObject => 1,
            Role::WidgetObject => 2,
            Role::ExtensionObject => 3,
            Role::PreferencesObject => 4,
            Role::ToolbarObject => 5,
        }
    }
}

/// Identifier names currently believed to denote each role.
///
/// Canonical names are present before any walk begins and are never removed;
/// discovered aliases are only appended. Matching the source language's
/// hoisting of `var`, an alias stays valid for the remainder of the walk once
/// recorded. One table per script; aliasing does not cross file boundaries.
#[derive(Debug, Clone)]
pub struct AliasTable {
    names: [Vec<String>; 6],
}

impl AliasTable {
    /// A table seeded with the canonical/default names per role.
    pub fn seeded() -> Self {
        let seed = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
        Self {
            names: [
                seed(&["window"]),
                seed(&["opera", "window.opera"]),
                seed(&["widget", "window.widget"]),
                seed(&["opera.extension"]),
                seed(&["widget.preferences", "window.widget.preferences"]),
                seed(&["opera.contexts.toolbar"]),
            ],
        }
    }

    /// Record `name` as an alias of `role`. Duplicates are harmless.
    pub fn record(&mut self, role: Role, name: impl Into<String>) {
        let name = name.into();
        let entries = &mut self.names[role.index()];
        if !entries.contains(&name) {
            entries.push(name);
        }
    }

    /// Set-like membership test.
    pub fn is_alias(&self, role: Role, text: &str) -> bool {
        self.names[role.index()].iter().any(|n| n == text)
    }

    /// Whether any of the role's aliases occurs as a substring of `text`.
    /// Used as a cheap pre-filter before structural checks.
    pub fn mentioned_in(&self, role: Role, text: &str) -> bool {
        self.names[role.index()]
            .iter()
            .any(|name| text.contains(name.as_str()))
    }

    /// The default name used when synthesizing replacement text.
    pub fn canonical(&self, role: Role) -> &str {
        &self.names[role.index()][0]
    }

    pub fn names(&self, role: Role) -> &[String] {
        &self.names[role.index()]
    }
}
