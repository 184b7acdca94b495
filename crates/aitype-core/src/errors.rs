use crate::types::TypeSyntaxError;
use thiserror::Error;

/// Failures loading inputs or configuration.
///
/// Type errors found while checking are never reported through this type;
/// they are collected as [`crate::Diagnostic`]s.
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid syntax tree: {0}")]
    SyntaxTree(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("Invalid type expression '{text}' for '{name}': {error}")]
    TypeSyntax {
        name: String,
        text: String,
        #[source]
        error: TypeSyntaxError,
    },
}

pub type Result<T> = std::result::Result<T, CheckerError>;
