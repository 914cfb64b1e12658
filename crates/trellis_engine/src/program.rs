//! Compiled template representation.
//!
//! A compile produces a [`TemplateArtifact`]: the document-ordered render
//! program, the export dispatch table, and the typedef documentation. The
//! artifact is plain data (serde-serializable) so compiled templates can
//! be cached or shipped; the runtime executes it without re-parsing the
//! template text.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Which kind of include a directive defers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncludeKind {
    /// A previously compiled template, invoked at render time.
    Partial,
    /// A stateful object constructed at render time.
    Component,
}

impl IncludeKind {
    /// The marker-text prefix used for deferred-include comment nodes.
    pub fn marker_prefix(&self) -> &'static str {
        match self {
            IncludeKind::Partial => "partial",
            IncludeKind::Component => "component",
        }
    }
}

/// One step of the render program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Append literal text to the markup.
    Append(String),
    /// Append an expression's value verbatim.
    Interpolate(String),
    /// Append an expression's value, HTML-escaped.
    Escape(String),
    /// Defer an include and append its marker.
    Include {
        kind: IncludeKind,
        reference: String,
        params: Option<String>,
        export: Option<String>,
    },
    /// Execute a host-code block.
    Eval(String),
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Append(text) => write!(f, "append {text:?}"),
            Op::Interpolate(code) => write!(f, "interpolate ({code})"),
            Op::Escape(code) => write!(f, "escape ({code})"),
            Op::Include {
                kind,
                reference,
                params,
                export,
            } => {
                write!(f, "include {} {reference}", kind.marker_prefix())?;
                if let Some(params) = params {
                    write!(f, " params=({params})")?;
                }
                if let Some(export) = export {
                    write!(f, " export={export}")?;
                }
                Ok(())
            }
            Op::Eval(code) => write!(f, "eval {{ {code} }}"),
        }
    }
}

/// The ordered render program.
pub type Program = Vec<Op>;

/// Whether an export arm holds one value or accumulates a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportArity {
    Single,
    Many,
}

/// The export-dispatch table: one arm per declared export name.
///
/// Always contains the implicit `root` arm.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchSpec {
    arms: HashMap<String, ExportArity>,
}

impl DispatchSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, arity: ExportArity) {
        self.arms.insert(name.into(), arity);
    }

    pub fn arity(&self, name: &str) -> Option<ExportArity> {
        self.arms.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }

    /// Declared export names, sorted for stable output.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.arms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Everything a compile produces for one template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateArtifact {
    /// The template's registered name.
    pub name: String,
    /// Document-ordered render program.
    pub program: Program,
    /// Export-dispatch table.
    pub dispatch: DispatchSpec,
    /// Input-shape typedef: the declared whole-input type verbatim, or
    /// the inferred shape rendered as a typedef block.
    pub input_typedef: Option<String>,
    /// Output-shape typedef rendered from the export holder.
    pub output_typedef: String,
    /// Whether the template declares or infers an input shape; templates
    /// without one are invoked with options only.
    pub takes_data: bool,
}

impl TemplateArtifact {
    /// Human-readable program listing, one op per line.
    pub fn listing(&self) -> String {
        self.program
            .iter()
            .map(|op| op.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_spec() {
        let mut spec = DispatchSpec::new();
        assert!(spec.is_empty());
        spec.add("root", ExportArity::Single);
        spec.add("rows", ExportArity::Many);
        assert_eq!(spec.arity("root"), Some(ExportArity::Single));
        assert_eq!(spec.arity("rows"), Some(ExportArity::Many));
        assert_eq!(spec.arity("other"), None);
        assert_eq!(spec.names(), vec!["root", "rows"]);
    }

    #[test]
    fn test_op_display() {
        let op = Op::Include {
            kind: IncludeKind::Partial,
            reference: "ui.row".to_string(),
            params: Some("this.item".to_string()),
            export: Some("row".to_string()),
        };
        assert_eq!(
            op.to_string(),
            "include partial ui.row params=(this.item) export=row"
        );
    }
}
