//! Compiled templates and render execution.

use serde_json::Value;
use tracing::debug;
use trellis_dom::{NodeId, Tree};
use trellis_engine::{IncludeKind, Op, TemplateArtifact};

use crate::builder;
use crate::error::{RuntimeError, RuntimeResult};
use crate::escape::escape_html;
use crate::eval::{value_to_string, Evaluator, PathEvaluator};
use crate::exports::{Dispatcher, ExportMap, ExportValue};
use crate::include::{marker_text, DeferredInclude, IncludeTable};
use crate::namespace::Namespace;
use crate::options::RenderOptions;

/// An executable compiled template.
#[derive(Debug)]
pub struct CompiledTemplate {
    artifact: TemplateArtifact,
}

impl CompiledTemplate {
    pub fn from_artifact(artifact: TemplateArtifact) -> Self {
        Self { artifact }
    }

    pub fn name(&self) -> &str {
        &self.artifact.name
    }

    pub fn artifact(&self) -> &TemplateArtifact {
        &self.artifact
    }

    /// Render into a fresh tree, returning the tree and the export map.
    ///
    /// Partial references resolve against `namespace`; templates that
    /// declare no input shape can be invoked with `data = None`.
    pub fn render(
        &self,
        namespace: &Namespace,
        data: Option<&Value>,
        options: &RenderOptions,
    ) -> RuntimeResult<RenderResult> {
        let mut tree = Tree::new();
        let exports = self.render_into(&mut tree, namespace, data, options)?;
        Ok(RenderResult { tree, exports })
    }

    /// Render into an existing tree; nested partial renders share the
    /// caller's arena so their subtrees can be spliced in place.
    pub(crate) fn render_into(
        &self,
        tree: &mut Tree,
        namespace: &Namespace,
        data: Option<&Value>,
        options: &RenderOptions,
    ) -> RuntimeResult<ExportMap> {
        let (markup, table) = self.execute(namespace, data, options)?;
        debug!(
            template = %self.artifact.name,
            includes = table.len(),
            "built markup"
        );
        let dispatcher = Dispatcher::new(&self.artifact.dispatch);
        builder::assemble(tree, &markup, table, &dispatcher, namespace, options)
    }

    /// Execute the render program: build the markup string and populate
    /// the deferred-include side table.
    fn execute(
        &self,
        namespace: &Namespace,
        data: Option<&Value>,
        options: &RenderOptions,
    ) -> RuntimeResult<(String, IncludeTable)> {
        static DEFAULT_EVALUATOR: PathEvaluator = PathEvaluator;
        let evaluator = options.evaluator().unwrap_or(&DEFAULT_EVALUATOR);
        let mut markup = String::new();
        let mut table = IncludeTable::new();

        for op in &self.artifact.program {
            match op {
                Op::Append(text) => markup.push_str(text),
                Op::Interpolate(code) => {
                    let value = evaluator.expression(code, data)?;
                    markup.push_str(&value_to_string(&value));
                }
                Op::Escape(code) => {
                    let value = evaluator.expression(code, data)?;
                    markup.push_str(&escape_html(&value_to_string(&value)));
                }
                Op::Include {
                    kind,
                    reference,
                    params,
                    export,
                } => {
                    let params = match params {
                        Some(source) => normalize_params(evaluator.expression(source, data)?),
                        None => None,
                    };
                    let include = match kind {
                        IncludeKind::Partial => DeferredInclude::Partial {
                            template: namespace.template(reference).ok_or_else(|| {
                                RuntimeError::TemplateNotFound(reference.clone())
                            })?,
                            params,
                            export: export.clone(),
                        },
                        IncludeKind::Component => DeferredInclude::Component {
                            factory: namespace.component(reference).ok_or_else(|| {
                                RuntimeError::ComponentNotFound(reference.clone())
                            })?,
                            params,
                            export: export.clone(),
                        },
                    };
                    let id = table.defer(include);
                    markup.push_str("<!--");
                    markup.push_str(&marker_text(*kind, id));
                    markup.push_str("-->");
                }
                Op::Eval(code) => evaluator.block(code, data, &mut markup)?,
            }
        }
        Ok((markup, table))
    }
}

/// A false-like params value means the include is invoked without data.
fn normalize_params(value: Value) -> Option<Value> {
    match value {
        Value::Null | Value::Bool(false) => None,
        other => Some(other),
    }
}

/// The outcome of one render: the tree arena and the export map.
#[derive(Debug)]
pub struct RenderResult {
    pub tree: Tree,
    pub exports: ExportMap,
}

impl RenderResult {
    /// The container node, registered under the reserved `root` key.
    pub fn root(&self) -> Option<NodeId> {
        self.exports.get("root").and_then(ExportValue::as_node)
    }

    /// Serialize the container back to markup.
    pub fn html(&self) -> String {
        self.root()
            .map(|root| self.tree.serialize(root))
            .unwrap_or_default()
    }
}
