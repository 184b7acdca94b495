pub mod ast;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod plugin;
pub mod span;
pub mod stdlib;
pub mod typechecker;
pub mod types;

pub use ast::{parse_program, Node, NodeKind};
pub use config::{CheckerConfig, CheckerOptions, CliOverrides, OutputFormat, CONFIG_FILE_NAME};
pub use diagnostics::{render_diagnostic, Diagnostic, DiagnosticRenderer};
pub use errors::CheckerError;
pub use plugin::{type_check_plugin, TypeCheckFailure};
pub use span::{LineIndex, Span};
pub use stdlib::{build_std_scope, std_scope};
pub use typechecker::{
    type_check, type_check_block, Scope, ScopeId, ScopeTree, TypeChecker, TypeCompatibility,
};
pub use types::{parse_type, FunctionType, Type};
