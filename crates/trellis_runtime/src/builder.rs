//! Render-tree assembly.
//!
//! Takes the markup a render program produced, resolves every deferred
//! include in document order, collects tagged export nodes, and returns
//! the export map. The traversal mutates the tree it is walking; the
//! explicit cursor is advanced past spliced content per the rules below,
//! which is what makes that safe.

use tracing::debug;
use trellis_dom::{NodeId, NodeKind, Tree};
use trellis_engine::EXPORT_ATTRIBUTE;

use crate::component::{Component, ComponentFactory};
use crate::error::{RuntimeError, RuntimeResult};
use crate::exports::{Dispatcher, ExportMap, ExportValue};
use crate::include::{parse_marker, DeferredInclude, IncludeTable};
use crate::namespace::Namespace;
use crate::options::RenderOptions;

/// Assemble the final tree and export map from built markup and its
/// deferred-include side table.
pub(crate) fn assemble(
    tree: &mut Tree,
    markup: &str,
    mut table: IncludeTable,
    dispatcher: &Dispatcher<'_>,
    namespace: &Namespace,
    options: &RenderOptions,
) -> RuntimeResult<ExportMap> {
    let container = tree.parse_into(markup)?;
    let mut exports = ExportMap::new();

    // First pass: preorder document-order walk resolving include markers.
    // The walk stays inside `container` because the container fragment is
    // unattached while its own assembly runs.
    let mut cursor = Some(container);
    while let Some(node) = cursor {
        let mut next = next_node(tree, node);

        let marker = tree.comment_text(node).and_then(parse_marker);
        if let Some((_, id)) = marker {
            let include = table
                .take(id)
                .ok_or(RuntimeError::MissingInclude(id))?;
            match include {
                DeferredInclude::Partial {
                    template,
                    params,
                    export,
                } => {
                    let mut result =
                        template.render_into(tree, namespace, params.as_ref(), options)?;
                    let content = match result.remove("root") {
                        Some(ExportValue::Node(root)) => root,
                        _ => {
                            return Err(RuntimeError::Protocol(
                                "partial result has no root container".to_string(),
                            ))
                        }
                    };
                    let last = last_of_subtree(tree, content);
                    tree.insert_before(content, node)?;
                    tree.detach(node);
                    // Continue from the last spliced node so the inserted
                    // subtree is visited next; an empty splice falls back
                    // to the node that followed the marker.
                    if let Some(last) = last {
                        next = Some(last);
                    }
                    if let Some(name) = export {
                        dispatcher.dispatch(&mut exports, &name, ExportValue::Template(result))?;
                    }
                }
                DeferredInclude::Component {
                    factory,
                    params,
                    export,
                } => {
                    let instance = factory.create(tree, params.as_ref())?;
                    if let Some(hook) = options.before_hook() {
                        hook(instance.as_ref());
                    }
                    let content = instance.container();
                    let last = last_of_subtree(tree, content);
                    tree.insert_before(content, node)?;
                    if let Some(hook) = options.after_hook() {
                        hook(instance.as_ref());
                    }
                    tree.detach(node);
                    if let Some(last) = last {
                        next = Some(last);
                    }
                    if let Some(name) = export {
                        dispatcher.dispatch(
                            &mut exports,
                            &name,
                            ExportValue::Component(instance),
                        )?;
                    }
                }
            }
        }
        cursor = next;
    }

    if !table.is_empty() {
        return Err(RuntimeError::UnresolvedIncludes(table.len()));
    }

    // Second pass: collect tagged export nodes in tree order, stripping
    // the marking attribute.
    for node in tree.descendants_with_attribute(container, EXPORT_ATTRIBUTE) {
        if let Some(key) = tree.remove_attribute(node, EXPORT_ATTRIBUTE) {
            dispatcher.dispatch(&mut exports, &key, ExportValue::Node(node))?;
        }
    }

    // The container itself is registered exactly once, last.
    dispatcher.dispatch(&mut exports, "root", ExportValue::Node(container))?;
    debug!(exports = exports.len(), "assembled render tree");
    Ok(exports)
}

/// Document-order successor: first child, else next sibling, else the
/// nearest ancestor's next sibling.
fn next_node(tree: &Tree, current: NodeId) -> Option<NodeId> {
    if let Some(child) = tree.first_child(current) {
        return Some(child);
    }
    if let Some(sibling) = tree.next_sibling(current) {
        return Some(sibling);
    }
    let mut ancestor = tree.parent(current);
    while let Some(node) = ancestor {
        if let Some(sibling) = tree.next_sibling(node) {
            return Some(sibling);
        }
        ancestor = tree.parent(node);
    }
    None
}

/// The last node of an include's content: the final child for a fragment
/// container, the node itself otherwise.
fn last_of_subtree(tree: &Tree, content: NodeId) -> Option<NodeId> {
    if matches!(tree.kind(content), NodeKind::Fragment) {
        tree.last_child(content)
    } else {
        Some(content)
    }
}
