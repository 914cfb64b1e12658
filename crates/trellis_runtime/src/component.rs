//! Component contract.
//!
//! Components are stateful objects constructed at render time and spliced
//! into the tree by their container. Factories are registered in a
//! [`Namespace`](crate::Namespace) and looked up by the reference name in
//! a `{{% … }}` directive.

use std::rc::Rc;

use serde_json::Value;
use trellis_dom::{NodeId, Tree};

use crate::error::RuntimeResult;

/// A constructed component instance.
pub trait Component {
    /// The component's container node inside the render tree.
    fn container(&self) -> NodeId;
}

/// Constructs component instances, building their subtree in the shared
/// render tree.
pub trait ComponentFactory: Send + Sync {
    fn create(&self, tree: &mut Tree, params: Option<&Value>) -> RuntimeResult<Rc<dyn Component>>;
}

impl<F> ComponentFactory for F
where
    F: Fn(&mut Tree, Option<&Value>) -> RuntimeResult<Rc<dyn Component>> + Send + Sync,
{
    fn create(&self, tree: &mut Tree, params: Option<&Value>) -> RuntimeResult<Rc<dyn Component>> {
        self(tree, params)
    }
}
