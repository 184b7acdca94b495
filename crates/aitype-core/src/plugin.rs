use crate::ast::Node;
use crate::diagnostics::Diagnostic;
use crate::stdlib::std_scope;
use crate::typechecker::type_check_block;
use thiserror::Error;
use tracing::debug;

/// A parsed program rejected by the checker
#[derive(Debug, Clone, Error)]
#[error("type check failed with {} error(s)", .diagnostics.len())]
pub struct TypeCheckFailure {
    pub diagnostics: Vec<Diagnostic>,
}

/// Post-parse hook: hand the tree back when it checks cleanly.
///
/// Each call starts from a fresh child of the standard scope, so declarations
/// from one program are never visible to the next.
pub fn type_check_plugin(nodes: Vec<Node>) -> Result<Vec<Node>, TypeCheckFailure> {
    let diagnostics = type_check_block(&nodes, std_scope());
    if diagnostics.is_empty() {
        return Ok(nodes);
    }
    debug!(count = diagnostics.len(), "plugin rejected program");
    Err(TypeCheckFailure { diagnostics })
}
