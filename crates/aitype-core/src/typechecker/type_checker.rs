use super::scope::{Scope, ScopeId, ScopeTree};
use super::type_compat::TypeCompatibility;
use super::visitors::{TypeInferenceVisitor, TypeInferrer};
use crate::ast::{Node, NodeKind, TemplatePart};
use crate::diagnostics::Diagnostic;
use crate::span::Span;
use crate::types::Type;
use tracing::{debug, trace};

/// Walks a syntax tree, threading lexical scopes and collecting diagnostics.
///
/// A checker owns the scopes it opens; the globals it starts from are only
/// read. Checking never stops at the first error: every statement is visited
/// and all diagnostics are returned together.
pub struct TypeChecker<'g> {
    scopes: ScopeTree<'g>,
    diagnostics: Vec<Diagnostic>,
}

impl<'g> TypeChecker<'g> {
    pub fn new(globals: &'g Scope) -> Self {
        Self {
            scopes: ScopeTree::new(globals),
            diagnostics: Vec::new(),
        }
    }

    pub fn scopes(&self) -> &ScopeTree<'g> {
        &self.scopes
    }

    /// The program-level scope, a fresh child of the globals
    pub fn root_scope(&self) -> ScopeId {
        self.scopes.root()
    }

    /// Check top-level statements in the root scope
    pub fn check_program(&mut self, nodes: &[Node]) -> Vec<Diagnostic> {
        let root = self.scopes.root();
        self.check_block(nodes, root, None);
        debug!(
            statements = nodes.len(),
            scopes = self.scopes.len(),
            diagnostics = self.diagnostics.len(),
            "type check finished"
        );
        self.take_diagnostics()
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn infer(&mut self, node: &Node, scope: ScopeId) -> Type {
        TypeInferrer::new(&mut self.scopes).infer_expression(node, scope)
    }

    /// Check statements in order within `scope`.
    ///
    /// `parent` is the innermost function or loop node; a `return` directly
    /// under a function is checked against that function's return type.
    pub fn check_block(&mut self, nodes: &[Node], scope: ScopeId, parent: Option<&Node>) {
        for node in nodes {
            if let (Some(Node { kind: NodeKind::Loop(_), .. }), NodeKind::Break) =
                (parent, &node.kind)
            {
                trace!(at = %node.span(), "break inside loop");
            }

            self.check_node(node, scope, parent);

            if let (Some(func), NodeKind::Return(ret)) = (parent, &node.kind) {
                if func.as_fn().is_none() {
                    continue;
                }
                if let Type::Function(fn_type) = self.infer(func, scope) {
                    let value_type = self.infer(&ret.expr, scope);
                    let at = ret.expr.loc.unwrap_or_else(|| node.span());
                    self.report_mismatches(&fn_type.return_type, &value_type, at);
                }
            }
        }
    }

    pub fn check_node(&mut self, node: &Node, scope: ScopeId, parent: Option<&Node>) {
        match &node.kind {
            NodeKind::Def(def) => {
                let expr_type = self.infer(&def.expr, scope);
                self.check_node(&def.expr, scope, parent);

                // The binding survives a mismatch so later uses see the declared type
                let bound = match &def.var_type {
                    Some(annotation) => {
                        let declared = self.infer(annotation, scope);
                        self.report_mismatches(&declared, &expr_type, node.span());
                        declared
                    }
                    None => expr_type,
                };
                self.scopes.set_variable(scope, def.name.clone(), bound);
            }

            NodeKind::Assign(assign) => {
                let dest_type = self.infer(&assign.dest, scope);
                let expr_type = self.infer(&assign.expr, scope);
                self.check_node(&assign.expr, scope, parent);
                self.report_mismatches(&dest_type, &expr_type, assign.dest.span());
            }

            NodeKind::AddAssign(assign) | NodeKind::SubAssign(assign) => {
                let dest_type = self.infer(&assign.dest, scope);
                let expr_type = self.infer(&assign.expr, scope);
                self.check_node(&assign.expr, scope, parent);
                // Each side must accept a number
                self.report_mismatches(&dest_type, &Type::num(), assign.dest.span());
                self.report_mismatches(&expr_type, &Type::num(), assign.expr.span());
            }

            NodeKind::Call(call) => {
                let callee = self.infer(&call.target, scope);
                self.check_node(&call.target, scope, parent);

                let Type::Function(func) = &callee else {
                    if !callee.is_any() {
                        self.report(
                            format!("Type '{}' is not callable", callee),
                            call.target.span(),
                        );
                    }
                    self.check_each(&call.args, scope, parent);
                    return;
                };

                if let Type::Tuple(params) = func.args.as_ref() {
                    if params.len() != call.args.len() {
                        self.report(
                            format!(
                                "Expected {} arguments but got {}",
                                params.len(),
                                call.args.len()
                            ),
                            node.span(),
                        );
                    }
                }

                let arg_types: Vec<Type> =
                    call.args.iter().map(|arg| self.infer(arg, scope)).collect();
                self.check_each(&call.args, scope, parent);

                match func.args.as_ref() {
                    Type::Tuple(params) => {
                        for ((param, arg), actual) in params.iter().zip(&call.args).zip(&arg_types)
                        {
                            self.report_mismatches(param, actual, arg.span());
                        }
                    }
                    args => self.report_mismatches(args, &Type::Tuple(arg_types), node.span()),
                }
            }

            NodeKind::For(for_loop) => {
                for bound in [&for_loop.from, &for_loop.to, &for_loop.times]
                    .into_iter()
                    .flatten()
                {
                    self.check_node(bound, scope, parent);
                }

                let for_scope = self.scopes.create_child_scope(scope);
                if let Some(var) = &for_loop.var {
                    self.scopes.set_variable(for_scope, var.clone(), Type::num());
                }
                self.check_node(&for_loop.body, for_scope, parent);
            }

            NodeKind::Each(each) => {
                self.check_node(&each.items, scope, parent);
                let each_scope = self.scopes.create_child_scope(scope);
                self.scopes
                    .set_variable(each_scope, each.var.clone(), Type::any());
                self.check_node(&each.body, each_scope, parent);
            }

            NodeKind::Loop(body) => {
                let loop_scope = self.scopes.create_child_scope(scope);
                self.check_block(&body.statements, loop_scope, Some(node));
            }

            NodeKind::Block(block) => {
                let block_scope = self.scopes.create_child_scope(scope);
                self.check_block(&block.statements, block_scope, parent);
            }

            NodeKind::If(if_expr) => {
                // Every part gets its own scope; nothing leaks between branches
                self.check_isolated(&if_expr.cond, scope, parent);
                self.check_isolated(&if_expr.then, scope, parent);
                for branch in &if_expr.elseif {
                    self.check_isolated(&branch.cond, scope, parent);
                    self.check_isolated(&branch.then, scope, parent);
                }
                if let Some(else_branch) = &if_expr.else_branch {
                    self.check_isolated(else_branch, scope, parent);
                }
            }

            NodeKind::Ns(ns) => {
                let ns_scope = self.scopes.create_child_scope(scope);
                self.check_block(&ns.members, ns_scope, parent);

                let exported: Vec<(String, Type)> = self
                    .scopes
                    .scope(ns_scope)
                    .variables()
                    .map(|(name, typ)| (format!("{}:{}", ns.name, name), typ.clone()))
                    .collect();
                debug!(namespace = %ns.name, members = exported.len(), "re-exporting namespace");
                for (name, typ) in exported {
                    self.scopes.set_variable(scope, name, typ);
                }
            }

            NodeKind::Fn(func) => {
                let fn_scope = self.scopes.create_child_scope(scope);
                for arg in &func.args {
                    let typ = match &arg.arg_type {
                        Some(annotation) => self.infer(annotation, scope),
                        None => Type::any(),
                    };
                    self.scopes.set_variable(fn_scope, arg.name.clone(), typ);
                }
                self.check_block(&func.children, fn_scope, Some(node));
            }

            NodeKind::Return(ret) => self.check_node(&ret.expr, scope, parent),
            NodeKind::Arr(arr) => self.check_each(&arr.value, scope, parent),
            NodeKind::Obj(obj) => {
                for value in obj.value.values() {
                    self.check_node(value, scope, parent);
                }
            }

            NodeKind::Not(not) => self.check_node(&not.expr, scope, parent),
            NodeKind::And(binary) | NodeKind::Or(binary) => {
                self.check_node(&binary.left, scope, parent);
                self.check_node(&binary.right, scope, parent);
            }
            NodeKind::Tmpl(tmpl) => {
                for part in &tmpl.tmpl {
                    if let TemplatePart::Expr(expr) = part {
                        self.check_node(expr, scope, parent);
                    }
                }
            }
            NodeKind::Index(index) => {
                self.check_node(&index.target, scope, parent);
                self.check_node(&index.index, scope, parent);
            }
            NodeKind::Prop(prop) => self.check_node(&prop.target, scope, parent),
            NodeKind::Match(match_expr) => {
                self.check_node(&match_expr.about, scope, parent);
                for arm in &match_expr.qs {
                    self.check_node(&arm.q, scope, parent);
                    self.check_node(&arm.a, scope, parent);
                }
                if let Some(default) = &match_expr.default {
                    self.check_node(default, scope, parent);
                }
            }

            NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Str(_)
            | NodeKind::Num(_)
            | NodeKind::Bool(_)
            | NodeKind::Null
            | NodeKind::Identifier(_)
            | NodeKind::NamedTypeSource(_)
            | NodeKind::FnTypeSource(_)
            | NodeKind::Other => {}
        }
    }

    fn check_each(&mut self, nodes: &[Node], scope: ScopeId, parent: Option<&Node>) {
        for node in nodes {
            self.check_node(node, scope, parent);
        }
    }

    /// Check `node` in a new child scope that is dropped afterwards
    fn check_isolated(&mut self, node: &Node, scope: ScopeId, parent: Option<&Node>) {
        let child = self.scopes.create_child_scope(scope);
        self.check_node(node, child, parent);
    }

    fn report_mismatches(&mut self, expected: &Type, actual: &Type, location: Span) {
        for message in TypeCompatibility::compare(expected, actual) {
            self.report(message, location);
        }
    }

    fn report(&mut self, message: String, location: Span) {
        self.diagnostics.push(Diagnostic::new(message, location));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib::std_scope;
    use serde_json::{json, Value};

    fn check(program: Value) -> Vec<Diagnostic> {
        let nodes: Vec<Node> = serde_json::from_value(program).unwrap();
        TypeChecker::new(std_scope()).check_program(&nodes)
    }

    fn named(name: &str) -> Value {
        json!({ "type": "namedTypeSource", "name": name })
    }

    fn ident(name: &str) -> Value {
        json!({ "type": "identifier", "name": name })
    }

    fn num(value: f64, start: usize, end: usize) -> Value {
        json!({ "type": "num", "value": value, "loc": { "start": start, "end": end } })
    }

    #[test]
    fn test_annotated_def_mismatch_keeps_binding() {
        let mut checker = TypeChecker::new(std_scope());
        let nodes: Vec<Node> = serde_json::from_value(json!([
            { "type": "def", "name": "x", "varType": named("str"),
              "expr": num(1234.0, 13, 17), "loc": { "start": 0, "end": 17 } }
        ]))
        .unwrap();

        let diagnostics = checker.check_program(&nodes);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location, Span::new(0, 17));
        assert_eq!(
            diagnostics[0].message,
            "Type 'num' is not assignable to type 'str'"
        );

        let root = checker.root_scope();
        assert_eq!(checker.scopes().get_variable(root, "x"), Some(&Type::str()));
    }

    #[test]
    fn test_unannotated_def_binds_inferred_type() {
        let diagnostics = check(json!([
            { "type": "def", "name": "x", "expr": num(1.0, 8, 9) },
            { "type": "assign", "dest": { "type": "identifier", "name": "x", "loc": { "start": 10, "end": 11 } },
              "expr": { "type": "str", "value": "s" } }
        ]));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location, Span::new(10, 11));
        assert_eq!(
            diagnostics[0].message,
            "Type 'str' is not assignable to type 'num'"
        );
    }

    #[test]
    fn test_compound_assignment_checks_both_sides() {
        let diagnostics = check(json!([
            { "type": "def", "name": "s", "expr": { "type": "str", "value": "" } },
            { "type": "addAssign",
              "dest": { "type": "identifier", "name": "s", "loc": { "start": 0, "end": 1 } },
              "expr": { "type": "bool", "value": true, "loc": { "start": 5, "end": 9 } } }
        ]));
        let locations: Vec<Span> = diagnostics.iter().map(|d| d.location).collect();
        assert_eq!(locations, [Span::new(0, 1), Span::new(5, 9)]);
        assert_eq!(
            diagnostics[0].message,
            "Type 'num' is not assignable to type 'str'"
        );
    }

    #[test]
    fn test_compound_assignment_accepts_union_containing_num() {
        let mut globals = std_scope().clone();
        globals.set_type("maybe", Type::union([Type::num(), Type::null()]));

        let nodes: Vec<Node> = serde_json::from_value(json!([
            { "type": "def", "name": "x", "varType": named("maybe"), "expr": num(1.0, 13, 14),
              "mut": true },
            { "type": "addAssign",
              "dest": { "type": "identifier", "name": "x", "loc": { "start": 16, "end": 17 } },
              "expr": num(1.0, 21, 22) }
        ]))
        .unwrap();

        assert!(TypeChecker::new(&globals).check_program(&nodes).is_empty());
    }

    #[test]
    fn test_not_callable() {
        let diagnostics = check(json!([
            { "type": "call",
              "target": { "type": "str", "value": "f", "loc": { "start": 0, "end": 3 } },
              "args": [] }
        ]));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Type 'str' is not callable");
        assert_eq!(diagnostics[0].location, Span::new(0, 3));
    }

    #[test]
    fn test_any_callee_is_not_reported() {
        assert!(check(json!([
            { "type": "call", "target": ident("unknown_fn"), "args": [num(1.0, 0, 1)] }
        ]))
        .is_empty());
    }

    #[test]
    fn test_variadic_callee_accepts_any_arguments() {
        assert!(check(json!([
            { "type": "call", "target": ident("print"),
              "args": [num(1.0, 0, 1), { "type": "str", "value": "x" }] }
        ]))
        .is_empty());
    }

    #[test]
    fn test_nested_call_arguments_are_checked() {
        let diagnostics = check(json!([
            { "type": "call", "target": ident("Core:add"), "args": [
                { "type": "call", "target": ident("Core:add"),
                  "args": [num(1.0, 0, 1)], "loc": { "start": 0, "end": 10 } },
                num(2.0, 11, 12)
            ] }
        ]));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "Expected 2 arguments but got 1");
        assert_eq!(diagnostics[0].location, Span::new(0, 10));
    }

    #[test]
    fn test_for_binds_counter_locally() {
        let mut checker = TypeChecker::new(std_scope());
        let nodes: Vec<Node> = serde_json::from_value(json!([
            { "type": "for", "var": "i", "from": num(0.0, 0, 1), "to": num(5.0, 2, 3),
              "for": { "type": "block", "statements": [
                  { "type": "def", "name": "s", "varType": named("str"), "expr": ident("i"),
                    "loc": { "start": 4, "end": 9 } }
              ] } }
        ]))
        .unwrap();

        let diagnostics = checker.check_program(&nodes);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location, Span::new(4, 9));

        let root = checker.root_scope();
        assert!(checker.scopes().get_variable(root, "i").is_none());
        assert!(checker.scopes().get_variable(root, "s").is_none());
    }

    #[test]
    fn test_return_inside_loop_is_checked_against_nothing() {
        // A loop body is walked with the loop as parent, so returns there are
        // only checked as expressions.
        assert!(check(json!([
            { "type": "fn", "args": [], "retType": named("str"), "children": [
                { "type": "loop", "statements": [
                    { "type": "return", "expr": num(1.0, 0, 1) },
                    { "type": "break" }
                ] }
            ] }
        ]))
        .is_empty());
    }

    #[test]
    fn test_return_in_nested_block_is_checked() {
        let diagnostics = check(json!([
            { "type": "fn", "args": [], "retType": named("str"), "children": [
                { "type": "if", "cond": { "type": "bool", "value": true },
                  "then": { "type": "block", "statements": [
                      { "type": "return", "expr": num(1.0, 20, 21) }
                  ] } }
            ] }
        ]));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location, Span::new(20, 21));
    }

    #[test]
    fn test_each_binds_item_as_any() {
        assert!(check(json!([
            { "type": "each", "var": "item", "items": { "type": "arr", "value": [] },
              "for": { "type": "block", "statements": [
                  { "type": "def", "name": "n", "varType": named("num"), "expr": ident("item") }
              ] } }
        ]))
        .is_empty());
    }

    #[test]
    fn test_errors_inside_nested_expressions_are_found() {
        let bad_call = json!({
            "type": "call", "target": ident("Core:not"),
            "args": [num(1.0, 30, 31)]
        });
        let diagnostics = check(json!([
            { "type": "not", "expr": bad_call.clone() },
            { "type": "tmpl", "tmpl": ["x = ", bad_call.clone()] },
            { "type": "arr", "value": [bad_call.clone()] },
            { "type": "obj", "value": { "k": bad_call.clone() } },
            { "type": "match", "about": bad_call.clone(), "qs": [], "default": null }
        ]));
        assert_eq!(diagnostics.len(), 5);
        assert!(diagnostics
            .iter()
            .all(|d| d.message == "Type 'num' is not assignable to type 'bool'"));
    }
}
