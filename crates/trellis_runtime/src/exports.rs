//! Export map and dispatch.
//!
//! The export dispatcher is the render-time realization of a template's
//! [`DispatchSpec`]: one arm per declared export name. Array-flagged arms
//! accumulate into a sequence created lazily on first dispatch; plain
//! arms reject a second assignment; undeclared keys reject outright.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use trellis_dom::NodeId;
use trellis_engine::{DispatchSpec, ExportArity};

use crate::component::Component;
use crate::error::{RuntimeError, RuntimeResult};

/// A value in the render result map.
pub enum ExportValue {
    /// A tree node tagged with an export attribute, or the container.
    Node(NodeId),
    /// An included partial's own result map, with its `root` detached.
    Template(ExportMap),
    /// An included component instance.
    Component(Rc<dyn Component>),
    /// Accumulated values of an array-flagged export, in document order.
    List(Vec<ExportValue>),
}

impl ExportValue {
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            ExportValue::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ExportMap> {
        match self {
            ExportValue::Template(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_component(&self) -> Option<&Rc<dyn Component>> {
        match self {
            ExportValue::Component(component) => Some(component),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ExportValue]> {
        match self {
            ExportValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Debug for ExportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportValue::Node(id) => f.debug_tuple("Node").field(id).finish(),
            ExportValue::Template(map) => f.debug_tuple("Template").field(map).finish(),
            ExportValue::Component(_) => f.write_str("Component(..)"),
            ExportValue::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

/// Named results of one render.
#[derive(Debug, Default)]
pub struct ExportMap {
    entries: HashMap<String, ExportValue>,
}

impl ExportMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ExportValue> {
        self.entries.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ExportValue> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Export names, sorted for stable output.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Render-time export dispatch over a compiled [`DispatchSpec`].
pub(crate) struct Dispatcher<'a> {
    spec: &'a DispatchSpec,
}

impl<'a> Dispatcher<'a> {
    pub fn new(spec: &'a DispatchSpec) -> Self {
        Self { spec }
    }

    pub fn dispatch(
        &self,
        exports: &mut ExportMap,
        key: &str,
        value: ExportValue,
    ) -> RuntimeResult<()> {
        match self.spec.arity(key) {
            None => Err(RuntimeError::UnknownExportKey(key.to_string())),
            Some(ExportArity::Many) => {
                let entry = exports
                    .entries
                    .entry(key.to_string())
                    .or_insert_with(|| ExportValue::List(Vec::new()));
                match entry {
                    ExportValue::List(items) => {
                        items.push(value);
                        Ok(())
                    }
                    _ => Err(RuntimeError::Protocol(format!(
                        "export {key} is not a sequence"
                    ))),
                }
            }
            Some(ExportArity::Single) => {
                if exports.entries.contains_key(key) {
                    return Err(RuntimeError::DuplicateExport(key.to_string()));
                }
                exports.entries.insert(key.to_string(), value);
                Ok(())
            }
        }
    }
}
