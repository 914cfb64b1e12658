//! # trellis_dom
//!
//! Arena node tree and markup parsing for trellis.
//!
//! This crate is the render-tree collaborator of the template runtime. It
//! provides an id-addressed node arena with the tree operations the
//! render-tree assembler needs: fragment containers, element/text/comment
//! nodes, sibling insertion with fragment splicing, attribute access, a
//! tree-order attribute query, and markup parsing/serialization.
//!
//! Comment nodes preserve their text verbatim; the runtime relies on this
//! to recognize deferred-include markers.
//!
//! ## Example
//!
//! ```rust
//! use trellis_dom::Tree;
//!
//! let mut tree = Tree::new();
//! let root = tree.parse_into("<ul><li>one</li><li>two</li></ul>").unwrap();
//! assert_eq!(tree.serialize(root), "<ul><li>one</li><li>two</li></ul>");
//! ```

pub mod arena;
pub mod error;
pub mod parser;

pub use arena::{NodeId, NodeKind, Tree};
pub use error::{DomError, DomResult};
