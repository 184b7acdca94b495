mod scope;
mod type_checker;
mod type_compat;
pub mod visitors;

pub use scope::{Scope, ScopeId, ScopeTree};
pub use type_checker::TypeChecker;
pub use type_compat::TypeCompatibility;
pub use visitors::{TypeInferenceVisitor, TypeInferrer};

use crate::ast::Node;
use crate::diagnostics::Diagnostic;
use crate::stdlib::std_scope;

/// Check a statement sequence in a fresh child of `globals`
pub fn type_check_block(nodes: &[Node], globals: &Scope) -> Vec<Diagnostic> {
    TypeChecker::new(globals).check_program(nodes)
}

/// Check a program against the standard scope
pub fn type_check(nodes: &[Node]) -> Vec<Diagnostic> {
    type_check_block(nodes, std_scope())
}
