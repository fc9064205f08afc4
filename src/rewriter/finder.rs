//! Permission and toolbar-button finders
//!
//! Answers "does this tree call method X through an object that looks like
//! role Y" without rewriting anything. Uses the same traversal primitive as
//! the walker. Matching is a best-guess heuristic: the second-to-last
//! segment of the callee chain either matches a shortcut list outright, or a
//! variable/expression statement elsewhere in the tree mentions it, which is
//! taken as evidence of an alias relationship. The call's own statement is
//! excluded from that fallback scan so it cannot vouch for itself.

use swc_core::common::{Span, Spanned};
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{Visit, VisitWith};

use super::parser::ParsedScript;
use crate::models::Permission;

/// Best guesses at container objects whose method calls imply a permission.
const LHS_SHORTCUTS: [&str; 4] = ["menu", "block", "allow", "tabs"];

/// The fixed method-name to permission mapping.
pub fn permission_for(method: &str) -> Option<Permission> {
    match method {
        "create" | "getAll" | "getFocused" | "getSelected" => Some(Permission::Tabs),
        "add" | "remove" => Some(Permission::WebRequest),
        "addItem" => Some(Permission::ContextMenus),
        _ => None,
    }
}

/// Look for a call to `method` and return the permission it implies.
pub fn find_api_call(script: &ParsedScript, method: &str) -> Option<Permission> {
    let permission = permission_for(method)?;
    if find(script, method, &LHS_SHORTCUTS) {
        Some(permission)
    } else {
        None
    }
}

/// First permission implied by any of `methods`, in the given order.
pub fn find_first_api_call(script: &ParsedScript, methods: &[&str]) -> Option<Permission> {
    methods.iter().find_map(|method| find_api_call(script, method))
}

/// Look for toolbar `addItem` registration so the manifest can declare a
/// browser action.
pub fn find_button(script: &ParsedScript) -> bool {
    find(script, "addItem", &["toolbar"])
}

fn find(script: &ParsedScript, method: &str, shortcuts: &[&str]) -> bool {
    let mut collector = CallSiteCollector {
        script,
        method,
        calls: Vec::new(),
        statements: Vec::new(),
    };
    script.script.visit_with(&mut collector);

    for (call_span, base) in &collector.calls {
        if shortcuts.contains(&base.as_str()) {
            return true;
        }
        let supported = collector.statements.iter().any(|(stmt_span, stmt_text)| {
            !contains_span(*stmt_span, *call_span) && stmt_text.contains(base)
        });
        if supported {
            return true;
        }
    }
    false
}

fn contains_span(outer: Span, inner: Span) -> bool {
    outer.lo <= inner.lo && inner.hi <= outer.hi
}

struct CallSiteCollector<'a> {
    script: &'a ParsedScript,
    method: &'a str,
    /// (call span, second-to-last callee segment) for calls to `method`.
    calls: Vec<(Span, String)>,
    /// (span, source text) of every variable and expression statement.
    statements: Vec<(Span, String)>,
}

impl Visit for CallSiteCollector<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Callee::Expr(callee) = &node.callee {
            if let Expr::Member(_) = &**callee {
                if let Some(text) = self.script.snippet(callee.span()) {
                    let chain: Vec<&str> = text.split('.').map(str::trim).collect();
                    if chain.len() >= 2 && chain[chain.len() - 1] == self.method {
                        self.calls
                            .push((node.span, chain[chain.len() - 2].to_string()));
                    }
                }
            }
        }
        node.visit_children_with(self);
    }

    fn visit_var_decl(&mut self, node: &VarDecl) {
        if let Some(text) = self.script.snippet(node.span) {
            self.statements.push((node.span, text));
        }
        node.visit_children_with(self);
    }

    fn visit_expr_stmt(&mut self, node: &ExprStmt) {
        if let Some(text) = self.script.snippet(node.span) {
            self.statements.push((node.span, text));
        }
        node.visit_children_with(self);
    }
}
