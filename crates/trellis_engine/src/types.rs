//! Type descriptors for inferred and declared template variables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape of a template variable as recorded in a holder.
///
/// Inference only ever produces the first four variants; `Named` carries
/// an explicitly declared type or a resolved export type verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarType {
    /// Plain string-valued use.
    String,
    /// Sequence; the element type name is known for declared exports.
    Array(Option<String>),
    /// Used through a property chain.
    Object,
    /// Conflicting or indeterminate uses.
    Unknown,
    /// Explicit user-declared or resolved type name.
    Named(String),
}

impl VarType {
    /// Whether the descriptor denotes a sequence.
    pub fn is_array(&self) -> bool {
        matches!(self, VarType::Array(_))
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarType::String => write!(f, "string"),
            VarType::Array(None) => write!(f, "array"),
            VarType::Array(Some(element)) => write!(f, "array<{element}>"),
            VarType::Object => write!(f, "object"),
            VarType::Unknown => write!(f, "unknown"),
            VarType::Named(name) => write!(f, "{name}"),
        }
    }
}
