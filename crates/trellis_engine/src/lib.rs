//! # trellis_engine
//!
//! Directive rewriter and type inference for trellis templates.
//!
//! The engine turns template text with embedded `{{…}}` directives into a
//! [`TemplateArtifact`]: a document-ordered render program, an export
//! dispatch table, and typedef documentation derived from how the
//! template uses its input.
//!
//! Directive kinds, selected by a one-character sigil after the opening
//! marker:
//!
//! - `{{* decl }}`: explicit type declaration (removed from output)
//! - `{{= expr }}`: interpolate a value verbatim
//! - `{{- expr }}`: interpolate a value, HTML-escaped
//! - `{{# args }}`: include a partial template
//! - `{{% args }}`: include a component
//! - `data-export-id="{{@ name }}"`: export the carrying node
//! - `{{ code }}`: raw host-code block
//!
//! Compilation is a pure in-memory transformation; executing the program
//! is the runtime crate's concern.
//!
//! ## Example
//!
//! ```rust
//! use trellis_engine::Engine;
//!
//! let mut engine = Engine::new();
//! let artifact = engine
//!     .compile("greeting", "<p>Hello, {{- this.name }}!</p>")
//!     .unwrap();
//! assert!(artifact.takes_data);
//! ```

pub mod analyzer;
pub mod assembler;
pub mod engine;
pub mod error;
pub mod escape;
pub mod holder;
pub mod program;
pub mod rewriter;
pub mod types;

pub use engine::{Engine, ROOT_TYPE};
pub use error::{CompileError, CompileResult};
pub use escape::EscapeTable;
pub use holder::Holder;
pub use program::{DispatchSpec, ExportArity, IncludeKind, Op, Program, TemplateArtifact};
pub use rewriter::EXPORT_ATTRIBUTE;
pub use types::VarType;
