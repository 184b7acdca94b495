use super::super::scope::{ScopeId, ScopeTree};
use crate::ast::{FnLiteral, Node, NodeKind};
use crate::types::{FunctionType, Type};

/// Static type of expression nodes
pub trait TypeInferenceVisitor {
    /// Infer the type of an expression.
    ///
    /// Unresolved names and node kinds without a rule are `any`.
    fn infer_expression(&mut self, node: &Node, scope: ScopeId) -> Type;

    /// Signature of a function literal, parameters bound in a fresh child scope
    fn infer_function(&mut self, func: &FnLiteral, scope: ScopeId) -> FunctionType;

    /// Type of the first `return` reachable in `body`, or `any`
    fn infer_return_type(&mut self, body: &[Node], scope: ScopeId) -> Type;
}

pub struct TypeInferrer<'a, 'g> {
    scopes: &'a mut ScopeTree<'g>,
}

impl<'a, 'g> TypeInferrer<'a, 'g> {
    pub fn new(scopes: &'a mut ScopeTree<'g>) -> Self {
        Self { scopes }
    }
}

impl TypeInferenceVisitor for TypeInferrer<'_, '_> {
    fn infer_expression(&mut self, node: &Node, scope: ScopeId) -> Type {
        match &node.kind {
            NodeKind::Str(_) => Type::str(),
            NodeKind::Num(_) => Type::num(),
            NodeKind::Bool(_) => Type::bool(),
            NodeKind::Null => Type::null(),
            NodeKind::Arr(_) => Type::arr(),
            NodeKind::Obj(_) => Type::obj(),

            NodeKind::NamedTypeSource(source) => self
                .scopes
                .get_type(scope, &source.name)
                .cloned()
                .unwrap_or_else(Type::any),

            NodeKind::FnTypeSource(source) => {
                let args = source
                    .args
                    .iter()
                    .map(|arg| self.infer_expression(arg, scope))
                    .collect::<Vec<_>>();
                let result = self.infer_expression(&source.result, scope);
                Type::signature(args, result)
            }

            NodeKind::Identifier(ident) => self
                .scopes
                .get_variable(scope, &ident.name)
                .cloned()
                .unwrap_or_else(Type::any),

            NodeKind::Fn(func) => Type::Function(self.infer_function(func, scope)),

            NodeKind::Call(call) => match self.infer_expression(&call.target, scope) {
                Type::Function(func) => *func.return_type,
                _ => Type::any(),
            },

            _ => Type::any(),
        }
    }

    fn infer_function(&mut self, func: &FnLiteral, scope: ScopeId) -> FunctionType {
        let fn_scope = self.scopes.create_child_scope(scope);

        let mut params = Vec::with_capacity(func.args.len());
        for arg in &func.args {
            let typ = match &arg.arg_type {
                Some(annotation) => self.infer_expression(annotation, scope),
                None => Type::any(),
            };
            self.scopes.set_variable(fn_scope, arg.name.clone(), typ.clone());
            params.push(typ);
        }

        let return_type = match &func.ret_type {
            Some(annotation) => self.infer_expression(annotation, scope),
            None => self.infer_return_type(&func.children, fn_scope),
        };

        FunctionType {
            args: Box::new(Type::Tuple(params)),
            return_type: Box::new(return_type),
        }
    }

    fn infer_return_type(&mut self, body: &[Node], scope: ScopeId) -> Type {
        match find_return(body) {
            Some(expr) => self.infer_expression(expr, scope),
            None => Type::any(),
        }
    }
}

/// Expression of the first `return` in source order. Nested function
/// literals own their returns and are not entered.
fn find_return(nodes: &[Node]) -> Option<&Node> {
    nodes.iter().find_map(return_in)
}

fn return_in(node: &Node) -> Option<&Node> {
    match &node.kind {
        NodeKind::Return(ret) => Some(&*ret.expr),
        NodeKind::Block(block) => find_return(&block.statements),
        NodeKind::Loop(body) => find_return(&body.statements),
        NodeKind::For(for_loop) => return_in(&for_loop.body),
        NodeKind::Each(each) => return_in(&each.body),
        NodeKind::If(if_expr) => return_in(&if_expr.then)
            .or_else(|| if_expr.elseif.iter().find_map(|branch| return_in(&branch.then)))
            .or_else(|| if_expr.else_branch.as_deref().and_then(return_in)),
        NodeKind::Match(match_expr) => match_expr
            .qs
            .iter()
            .find_map(|arm| return_in(&arm.a))
            .or_else(|| match_expr.default.as_deref().and_then(return_in)),
        _ => None,
    }
}
