//! # trellis_runtime
//!
//! Render runtime and tree assembly for trellis templates.
//!
//! The runtime executes compiled render programs: it builds the markup
//! string and a side table of deferred includes, parses the markup into a
//! node tree, resolves includes in document order (partials render
//! recursively into the shared tree, components are constructed and
//! spliced in), collects tagged export nodes, and returns the export map
//! with the container under the reserved `root` key.
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use trellis_runtime::{Namespace, RenderOptions};
//!
//! let mut ns = Namespace::new();
//! ns.register("greeting", "<p>Hello, {{- this.name }}!</p>").unwrap();
//!
//! let result = ns
//!     .render("greeting", Some(&json!({"name": "Ada"})), &RenderOptions::new())
//!     .unwrap();
//! assert_eq!(result.html(), "<p>Hello, Ada!</p>");
//! ```

pub mod builder;
pub mod component;
pub mod error;
pub mod escape;
pub mod eval;
pub mod exports;
pub mod include;
pub mod loader;
pub mod namespace;
pub mod options;
pub mod template;

pub use component::{Component, ComponentFactory};
pub use error::{RuntimeError, RuntimeResult};
pub use escape::escape_html;
pub use eval::{value_to_string, Evaluator, PathEvaluator};
pub use exports::{ExportMap, ExportValue};
pub use include::{DeferredInclude, IncludeTable};
pub use loader::{TemplateLoader, TEMPLATE_EXTENSION};
pub use namespace::Namespace;
pub use options::{ComponentHook, RenderOptions};
pub use template::{CompiledTemplate, RenderResult};
