//! Error types for template compilation.

use thiserror::Error;

/// Result type alias for compile operations.
pub type CompileResult<T> = Result<T, CompileError>;

/// Errors that abort a template compile.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Malformed include arguments: {0}")]
    BadIncludeArgs(String),

    #[error("Malformed type declaration: {0}")]
    BadTypedef(String),

    #[error("Template contains a NUL control character")]
    NulInTemplate,

    #[error("Internal rewrite corruption: {0}")]
    CorruptRewrite(String),
}
