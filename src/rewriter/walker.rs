//! Alias-tracking AST walker
//!
//! A single depth-first traversal that discovers aliases for the tracked
//! global roles, emits rewrite records for exportable top-level bindings and
//! preference-store assignments, and flags toolbar button registration.
//!
//! Scope depth increments only at function, arrow and block boundaries, so
//! "top level" means the script body itself. A separate nesting counter
//! bounds traversal depth; pathological inputs surface as a structured
//! recursion-limit failure instead of a stack overflow.

use lazy_static::lazy_static;
use regex::Regex;
use swc_core::common::{Span, Spanned};
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{Visit, VisitWith};

use super::aliases::{AliasTable, Role};
use super::parser::ParsedScript;
use super::{FunctionExportStrategy, RewriteOptions};

/// Which pattern produced a rewrite record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteKind {
    TopLevelExport,
    PreferenceAssignment,
    FunctionExport,
}

/// One recognized construct: the exact source text to replace and the text
/// to replace it with. Produced in traversal order, consumed immediately by
/// the text patcher.
#[derive(Debug, Clone)]
pub struct RewriteRecord {
    pub kind: RewriteKind,
    pub scope_depth: usize,
    pub original: String,
    pub replacement: String,
}

/// Everything a single walk produces.
pub struct WalkOutcome {
    pub records: Vec<RewriteRecord>,
    pub warnings: Vec<String>,
    pub has_button: bool,
    pub limit_hit: bool,
}

/// Walk `source`, updating `aliases` as declarations are discovered.
pub fn walk_script(
    source: &ParsedScript,
    aliases: &mut AliasTable,
    options: &RewriteOptions,
) -> WalkOutcome {
    let mut walker = ScriptWalker {
        source,
        aliases,
        options,
        scope_depth: 0,
        nesting: 0,
        limit_hit: false,
        records: Vec::new(),
        warnings: Vec::new(),
        has_button: false,
    };
    source.script.visit_with(&mut walker);
    WalkOutcome {
        records: walker.records,
        warnings: walker.warnings,
        has_button: walker.has_button,
        limit_hit: walker.limit_hit,
    }
}

struct ScriptWalker<'a> {
    source: &'a ParsedScript,
    aliases: &'a mut AliasTable,
    options: &'a RewriteOptions,
    scope_depth: usize,
    nesting: usize,
    limit_hit: bool,
    records: Vec<RewriteRecord>,
    warnings: Vec<String>,
    has_button: bool,
}

impl ScriptWalker<'_> {
    fn snippet(&mut self, span: Span, what: &str) -> Option<String> {
        match self.source.snippet(span) {
            Some(text) => Some(text),
            None => {
                self.warnings
                    .push(format!("could not read source text for {}, skipped", what));
                None
            }
        }
    }

    fn enter_scope(&mut self) -> bool {
        self.scope_depth += 1;
        self.enter_nesting()
    }

    fn leave_scope(&mut self) {
        self.scope_depth -= 1;
        self.leave_nesting();
    }

    fn enter_nesting(&mut self) -> bool {
        self.nesting += 1;
        if self.nesting > self.options.max_depth {
            self.limit_hit = true;
            return false;
        }
        true
    }

    fn leave_nesting(&mut self) {
        self.nesting -= 1;
    }

    /// Classify a declarator initializer by its printed source text and
    /// record the declared name under the matching role. Substring matching
    /// is deliberate: it accepts false positives (a string literal containing
    /// ".preferences" also matches) in exchange for not needing structural
    /// resolution of the initializer chain.
    fn classify_initializer(&mut self, name: &str, init_text: &str) {
        let text = init_text.trim();
        if self.aliases.is_alias(Role::Window, text) {
            self.aliases.record(Role::Window, name);
        } else if self.aliases.is_alias(Role::GlobalObject, text) {
            self.aliases.record(Role::GlobalObject, name);
        } else if self.aliases.is_alias(Role::WidgetObject, text) {
            self.aliases.record(Role::WidgetObject, name);
        } else if text.contains(".extension") {
            self.aliases.record(Role::ExtensionObject, name);
        } else if text.contains(".preferences") {
            self.aliases.record(Role::PreferencesObject, name);
        } else if self.options.track_toolbar_aliases && text.contains(".toolbar") {
            self.aliases.record(Role::ToolbarObject, name);
        }
    }

    /// Rewrite a top-level declaration list so every declared name is also
    /// assigned onto the window object: `var x = 1` -> `var x = window["x"] = 1`.
    fn record_top_level_export(&mut self, node: &VarDecl) {
        let Some(original) = self.snippet(node.span, "variable statement") else {
            return;
        };
        let window = self.aliases.canonical(Role::Window).to_string();

        let mut rewritten = Vec::with_capacity(node.decls.len());
        for decl in &node.decls {
            let text = match &decl.name {
                Pat::Ident(ident) => {
                    let name = ident.id.sym.as_ref();
                    match &decl.init {
                        Some(init) => {
                            let Some(init_text) =
                                self.snippet(init.span(), "variable initializer")
                            else {
                                return;
                            };
                            format!("{name} = {window}[\"{name}\"] = {init_text}")
                        }
                        None => format!("{name} = {window}[\"{name}\"]"),
                    }
                }
                // destructuring declarators have no single exportable name
                _ => {
                    let Some(text) = self.snippet(decl.span, "variable declarator") else {
                        return;
                    };
                    text
                }
            };
            rewritten.push(text);
        }

        let kind = match node.kind {
            VarDeclKind::Var => "var",
            VarDeclKind::Let => "let",
            VarDeclKind::Const => "const",
        };
        let terminator = if original.trim_end().ends_with(';') {
            ";"
        } else {
            ""
        };
        self.records.push(RewriteRecord {
            kind: RewriteKind::TopLevelExport,
            scope_depth: self.scope_depth,
            original,
            replacement: format!("{} {}{}", kind, rewritten.join(", "), terminator),
        });
    }

    /// Export a top-level function declaration onto the window object. The
    /// strategy is configurable because the two historical behaviors differ:
    /// preserving the name keeps self-recursion working, while the anonymous
    /// form replaces the declaration wholesale.
    fn record_function_export(&mut self, node: &FnDecl) {
        let Some(original) = self.snippet(node.span(), "function declaration") else {
            return;
        };
        let name = node.ident.sym.as_ref();
        let window = self.aliases.canonical(Role::Window);

        let replacement = match self.options.function_export {
            FunctionExportStrategy::PreserveName => {
                format!("{original}\nvar {name} = {window}[\"{name}\"] = {name};")
            }
            FunctionExportStrategy::Anonymous => {
                lazy_static! {
                    static ref FN_HEAD: Regex = Regex::new(r"function\s+\w+\s*\(").unwrap();
                }
                let anonymous = FN_HEAD.replacen(&original, 1, "function (");
                format!("var {name} = {window}[\"{name}\"] = {anonymous}")
            }
        };
        self.records.push(RewriteRecord {
            kind: RewriteKind::FunctionExport,
            scope_depth: self.scope_depth,
            original,
            replacement,
        });
    }

    /// Rewrite `prefsAlias.key = value` (or the bracket form) into a
    /// `setItem` call. Only a direct two-level `alias.key` target qualifies;
    /// deeper chains such as `document.getElementById(prefs.key).checked = x`
    /// pass through unmodified. At most one rewrite per statement root.
    fn try_preference_rewrite(&mut self, assign: &AssignExpr) {
        if assign.op != AssignOp::Assign {
            return;
        }
        let Some(stmt_text) = self.snippet(assign.span, "assignment") else {
            return;
        };
        if !self
            .aliases
            .mentioned_in(Role::PreferencesObject, &stmt_text)
        {
            return;
        }
        let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &assign.left else {
            return;
        };
        let Some(obj_text) = self.snippet(member.obj.span(), "assignment target") else {
            return;
        };
        let obj_text = obj_text.trim().to_string();
        if !self.aliases.is_alias(Role::PreferencesObject, &obj_text) {
            return;
        }
        let key = match &member.prop {
            MemberProp::Ident(prop) => format!("'{}'", prop.sym),
            MemberProp::Computed(computed) => {
                match self.snippet(computed.expr.span(), "preference key") {
                    Some(text) => text,
                    None => return,
                }
            }
            MemberProp::PrivateName(_) => return,
        };
        let Some(value) = self.snippet(assign.right.span(), "assignment value") else {
            return;
        };
        // at most one rewrite per statement root
        self.records.push(RewriteRecord {
            kind: RewriteKind::PreferenceAssignment,
            scope_depth: self.scope_depth,
            original: stmt_text,
            replacement: format!("{}.setItem({}, {})", obj_text, key, value),
        });
    }

    /// Detect toolbar button registration: a call to `addItem` whose base
    /// resolves to the toolbar role, either directly through the alias table
    /// or by ending in the canonical `toolbar` segment.
    fn check_toolbar_call(&mut self, node: &CallExpr) {
        if self.has_button {
            return;
        }
        let Callee::Expr(callee) = &node.callee else {
            return;
        };
        let Expr::Member(member) = &**callee else {
            return;
        };
        let MemberProp::Ident(prop) = &member.prop else {
            return;
        };
        if prop.sym.as_ref() != "addItem" {
            return;
        }
        let Some(base) = self.snippet(member.obj.span(), "call target") else {
            return;
        };
        let base = base.trim();
        let last_segment = base.rsplit('.').next().unwrap_or(base);
        if self.aliases.is_alias(Role::ToolbarObject, base) || last_segment == "toolbar" {
            self.has_button = true;
        }
    }
}

impl Visit for ScriptWalker<'_> {
    fn visit_function(&mut self, node: &Function) {
        if self.enter_scope() {
            node.visit_children_with(self);
        }
        self.leave_scope();
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        if self.enter_scope() {
            node.visit_children_with(self);
        }
        self.leave_scope();
    }

    fn visit_block_stmt(&mut self, node: &BlockStmt) {
        if self.enter_scope() {
            node.visit_children_with(self);
        }
        self.leave_scope();
    }

    // A `for (var k in o)` head must not grow an `= window["k"]` initializer,
    // so the whole statement counts as a nested scope.
    fn visit_for_in_stmt(&mut self, node: &ForInStmt) {
        if self.enter_scope() {
            node.visit_children_with(self);
        }
        self.leave_scope();
    }

    fn visit_for_of_stmt(&mut self, node: &ForOfStmt) {
        if self.enter_scope() {
            node.visit_children_with(self);
        }
        self.leave_scope();
    }

    fn visit_stmt(&mut self, node: &Stmt) {
        if self.enter_nesting() {
            node.visit_children_with(self);
        }
        self.leave_nesting();
    }

    fn visit_expr(&mut self, node: &Expr) {
        if self.enter_nesting() {
            node.visit_children_with(self);
        }
        self.leave_nesting();
    }

    fn visit_var_decl(&mut self, node: &VarDecl) {
        for decl in &node.decls {
            let Pat::Ident(ident) = &decl.name else {
                continue;
            };
            let name = ident.id.sym.to_string();
            if let Some(init) = &decl.init {
                if let Some(init_text) = self.snippet(init.span(), "variable initializer") {
                    self.classify_initializer(&name, &init_text);
                }
            }
        }
        if self.scope_depth == 0 {
            self.record_top_level_export(node);
        }
        node.visit_children_with(self);
    }

    fn visit_fn_decl(&mut self, node: &FnDecl) {
        if self.scope_depth == 0 {
            self.record_function_export(node);
        }
        node.visit_children_with(self);
    }

    fn visit_expr_stmt(&mut self, node: &ExprStmt) {
        if let Expr::Assign(assign) = &*node.expr {
            self.try_preference_rewrite(assign);
        }
        node.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        self.check_toolbar_call(node);
        node.visit_children_with(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewriter::parser::ScriptParser;
    use crate::rewriter::RewriteOptions;

    fn walk(code: &str) -> (WalkOutcome, AliasTable) {
        let parsed = ScriptParser::new().parse(code).unwrap();
        let mut aliases = AliasTable::seeded();
        let outcome = walk_script(&parsed, &mut aliases, &RewriteOptions::default());
        (outcome, aliases)
    }

    #[test]
    fn test_top_level_var_export_record() {
        let (outcome, _) = walk("var x = 1;");
        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.kind, RewriteKind::TopLevelExport);
        assert_eq!(record.scope_depth, 0);
        assert!(record.replacement.contains("x = window[\"x\"] = 1"));
    }

    #[test]
    fn test_multi_declarator_export() {
        let (outcome, _) = walk("var a = 1, b = 2;");
        let record = &outcome.records[0];
        assert!(record.replacement.contains("a = window[\"a\"] = 1"));
        assert!(record.replacement.contains("b = window[\"b\"] = 2"));
    }

    #[test]
    fn test_nested_var_not_exported() {
        let (outcome, _) = walk("function f() { var x = 1; }");
        assert!(outcome
            .records
            .iter()
            .all(|r| r.kind != RewriteKind::TopLevelExport));
    }

    #[test]
    fn test_alias_discovery_chains() {
        let (_, aliases) = walk(
            "var w = window, o = w.opera;\n\
             var prefs = w.widget.preferences;\n\
             var ext = o.extension;",
        );
        assert!(aliases.is_alias(Role::Window, "w"));
        assert!(aliases.is_alias(Role::PreferencesObject, "prefs"));
        assert!(aliases.is_alias(Role::ExtensionObject, "ext"));
    }

    #[test]
    fn test_preference_assignment_record() {
        let (outcome, _) = walk("var p = widget.preferences; p.foo = 34;");
        let pref = outcome
            .records
            .iter()
            .find(|r| r.kind == RewriteKind::PreferenceAssignment)
            .expect("preference record");
        assert_eq!(pref.original, "p.foo = 34");
        assert_eq!(pref.replacement, "p.setItem('foo', 34)");
    }

    #[test]
    fn test_preference_bracket_form_preserves_key_expression() {
        let (outcome, _) = walk("var p = widget.preferences; p[keyName] = 1;");
        let pref = outcome
            .records
            .iter()
            .find(|r| r.kind == RewriteKind::PreferenceAssignment)
            .expect("preference record");
        assert_eq!(pref.replacement, "p.setItem(keyName, 1)");
    }

    #[test]
    fn test_deep_chain_rejected() {
        let (outcome, _) = walk(
            "var p = widget.preferences;\n\
             document.getElementById(p.foo).checked = true;",
        );
        assert!(outcome
            .records
            .iter()
            .all(|r| r.kind != RewriteKind::PreferenceAssignment));
    }

    #[test]
    fn test_preference_read_not_rewritten() {
        let (outcome, _) = walk("var p = widget.preferences; x = p.foo;");
        assert!(outcome
            .records
            .iter()
            .all(|r| r.kind != RewriteKind::PreferenceAssignment));
    }

    #[test]
    fn test_function_export_preserves_name() {
        let (outcome, _) = walk("function greet() { return 1; }");
        let record = &outcome.records[0];
        assert_eq!(record.kind, RewriteKind::FunctionExport);
        assert!(record.replacement.starts_with("function greet()"));
        assert!(record
            .replacement
            .contains("var greet = window[\"greet\"] = greet;"));
    }

    #[test]
    fn test_function_export_anonymous_strategy() {
        let parsed = ScriptParser::new()
            .parse("function greet() { return 1; }")
            .unwrap();
        let mut aliases = AliasTable::seeded();
        let options = RewriteOptions {
            function_export: FunctionExportStrategy::Anonymous,
            ..RewriteOptions::default()
        };
        let outcome = walk_script(&parsed, &mut aliases, &options);
        let record = &outcome.records[0];
        assert!(record
            .replacement
            .starts_with("var greet = window[\"greet\"] = function ("));
    }

    #[test]
    fn test_toolbar_button_via_alias() {
        let (outcome, aliases) =
            walk("var tb = opera.contexts.toolbar; tb.addItem(props);");
        assert!(aliases.is_alias(Role::ToolbarObject, "tb"));
        assert!(outcome.has_button);
    }

    #[test]
    fn test_toolbar_button_direct() {
        let (outcome, _) = walk("opera.contexts.toolbar.addItem(props);");
        assert!(outcome.has_button);
    }

    #[test]
    fn test_no_button_for_menu_additem() {
        let (outcome, _) = walk("opera.contexts.menu.addItem(item);");
        assert!(!outcome.has_button);
    }

    #[test]
    fn test_recursion_limit_flag() {
        let mut code = String::new();
        for _ in 0..40 {
            code.push_str("function f() {");
        }
        code.push_str("var x = 1;");
        for _ in 0..40 {
            code.push('}');
        }
        let parsed = ScriptParser::new().parse(&code).unwrap();
        let mut aliases = AliasTable::seeded();
        let options = RewriteOptions {
            max_depth: 16,
            ..RewriteOptions::default()
        };
        let outcome = walk_script(&parsed, &mut aliases, &options);
        assert!(outcome.limit_hit);
    }
}
