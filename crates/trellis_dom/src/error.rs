//! Error types for the node tree.

use thiserror::Error;

/// Result type alias for tree operations.
pub type DomResult<T> = Result<T, DomError>;

/// Errors that can occur during tree operations.
#[derive(Error, Debug)]
pub enum DomError {
    #[error("Markup parse error: {0}")]
    Parse(String),

    #[error("Node has no parent; cannot insert relative to it")]
    Detached,
}
