//! Error types for template rendering.

use thiserror::Error;

/// Result type alias for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur while rendering a compiled template.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Export name is already defined: {0}")]
    DuplicateExport(String),

    #[error("Unknown export key: {0}")]
    UnknownExportKey(String),

    #[error("No deferred include recorded for marker id {0}")]
    MissingInclude(u64),

    #[error("{0} deferred include(s) left unresolved after assembly")]
    UnresolvedIncludes(usize),

    #[error("Assembly protocol violation: {0}")]
    Protocol(String),

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Expression error: {0}")]
    Expression(String),

    #[error("Host-code block requires a capable evaluator: {0}")]
    HostCode(String),

    #[error("Compile error: {0}")]
    Compile(#[from] trellis_engine::CompileError),

    #[error("Tree error: {0}")]
    Dom(#[from] trellis_dom::DomError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
