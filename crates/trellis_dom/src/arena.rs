//! Id-addressed node arena.
//!
//! Nodes live in a flat `Vec` and are addressed by [`NodeId`] handles.
//! Ids stay valid for the lifetime of the [`Tree`]; detached nodes are
//! unlinked but never freed. Insertion of a fragment splices its children
//! into place and leaves the fragment empty, matching document-fragment
//! semantics.

use crate::error::{DomError, DomResult};

/// Handle to a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// The kind of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Container without markup of its own; serializes as its children.
    Fragment,
    /// An element with a tag name and ordered attributes.
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    /// Literal text, kept verbatim (no entity decoding).
    Text(String),
    /// A comment; text preserved verbatim. Reserved marker node kind.
    Comment(String),
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// An arena-backed node tree.
#[derive(Debug, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Create a fragment container node.
    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeKind::Fragment)
    }

    /// Create an element node.
    pub fn create_element(&mut self, tag: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Element {
            tag: tag.into(),
            attributes: Vec::new(),
        })
    }

    /// Create a text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(text.into()))
    }

    /// Create a comment node. The text is preserved verbatim.
    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Comment(text.into()))
    }

    /// The kind of a node.
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// The element tag name, if the node is an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// The comment text, if the node is a comment.
    pub fn comment_text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Comment(text) => Some(text),
            _ => None,
        }
    }

    /// The text content, if the node is a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Get an attribute value by name.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Set an attribute, replacing an existing value of the same name.
    pub fn set_attribute(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let NodeKind::Element { attributes, .. } = &mut self.node_mut(id).kind {
            if let Some(entry) = attributes.iter_mut().find(|(n, _)| *n == name) {
                entry.1 = value;
            } else {
                attributes.push((name, value));
            }
        }
    }

    /// Remove an attribute by name, returning its value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        if let NodeKind::Element { attributes, .. } = &mut self.node_mut(id).kind {
            if let Some(pos) = attributes.iter().position(|(n, _)| n == name) {
                return Some(attributes.remove(pos).1);
            }
        }
        None
    }

    /// Unlink a node from its parent and siblings.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = self.node(id);
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if let Some(prev) = prev {
            self.node_mut(prev).next_sibling = next;
        } else if let Some(parent) = parent {
            self.node_mut(parent).first_child = next;
        }
        if let Some(next) = next {
            self.node_mut(next).prev_sibling = prev;
        } else if let Some(parent) = parent {
            self.node_mut(parent).last_child = prev;
        }
        let node = self.node_mut(id);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    fn link_last(&mut self, parent: NodeId, child: NodeId) {
        let old_last = self.node(parent).last_child;
        {
            let node = self.node_mut(child);
            node.parent = Some(parent);
            node.prev_sibling = old_last;
            node.next_sibling = None;
        }
        if let Some(last) = old_last {
            self.node_mut(last).next_sibling = Some(child);
        } else {
            self.node_mut(parent).first_child = Some(child);
        }
        self.node_mut(parent).last_child = Some(child);
    }

    fn link_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        let prev = self.node(reference).prev_sibling;
        {
            let node = self.node_mut(child);
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = Some(reference);
        }
        self.node_mut(reference).prev_sibling = Some(child);
        if let Some(prev) = prev {
            self.node_mut(prev).next_sibling = Some(child);
        } else {
            self.node_mut(parent).first_child = Some(child);
        }
    }

    /// Append a child as the last child of `parent`.
    ///
    /// Appending a fragment splices its children and empties the fragment.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if matches!(self.node(child).kind, NodeKind::Fragment) {
            while let Some(grandchild) = self.node(child).first_child {
                self.detach(grandchild);
                self.link_last(parent, grandchild);
            }
        } else {
            self.detach(child);
            self.link_last(parent, child);
        }
    }

    /// Insert a node immediately before `reference`.
    ///
    /// Inserting a fragment splices its children in order and empties the
    /// fragment. Fails if `reference` has no parent.
    pub fn insert_before(&mut self, new: NodeId, reference: NodeId) -> DomResult<()> {
        let parent = self.node(reference).parent.ok_or(DomError::Detached)?;
        if matches!(self.node(new).kind, NodeKind::Fragment) {
            while let Some(child) = self.node(new).first_child {
                self.detach(child);
                self.link_before(parent, child, reference);
            }
        } else {
            self.detach(new);
            self.link_before(parent, new, reference);
        }
        Ok(())
    }

    /// All descendants of `root` carrying the given attribute, in tree
    /// (document) order. `root` itself is not considered.
    pub fn descendants_with_attribute(&self, root: NodeId, name: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = Vec::new();
        let mut cursor = self.first_child(root);
        while let Some(id) = cursor {
            if self.attribute(id, name).is_some() {
                found.push(id);
            }
            if let Some(child) = self.first_child(id) {
                stack.push(id);
                cursor = Some(child);
                continue;
            }
            cursor = self.next_sibling(id);
            while cursor.is_none() {
                match stack.pop() {
                    Some(ancestor) => cursor = self.next_sibling(ancestor),
                    None => break,
                }
            }
        }
        found
    }

    /// Serialize a node (and its subtree) back to markup.
    ///
    /// Text is written verbatim; fragments serialize as their children.
    pub fn serialize(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match &self.node(id).kind {
            NodeKind::Fragment => self.write_children(id, out),
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&value.replace('"', "&quot;"));
                    out.push('"');
                }
                out.push('>');
                if crate::parser::is_void_element(tag) {
                    return;
                }
                self.write_children(id, out);
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn write_children(&self, id: NodeId, out: &mut String) {
        let mut child = self.first_child(id);
        while let Some(c) = child {
            self.write_node(c, out);
            child = self.next_sibling(c);
        }
    }
}
