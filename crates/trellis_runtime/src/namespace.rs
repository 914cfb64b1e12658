//! Template and component registry.
//!
//! A namespace owns the compile engine and maps names to compiled
//! templates and component factories. Include references in directives
//! resolve against the namespace the render was started from.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use trellis_engine::Engine;

use crate::component::ComponentFactory;
use crate::error::{RuntimeError, RuntimeResult};
use crate::options::RenderOptions;
use crate::template::{CompiledTemplate, RenderResult};

/// Registry of compiled templates and component factories.
///
/// Registration compiles through one owned [`Engine`], so registrations
/// cannot interleave (they take `&mut self`); rendering is read-only.
#[derive(Default)]
pub struct Namespace {
    engine: Engine,
    templates: HashMap<String, Arc<CompiledTemplate>>,
    components: HashMap<String, Arc<dyn ComponentFactory>>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a template body and register it under `name`.
    ///
    /// An existing template of the same name is replaced.
    pub fn register(&mut self, name: &str, body: &str) -> RuntimeResult<Arc<CompiledTemplate>> {
        let artifact = self.engine.compile(name, body)?;
        let template = Arc::new(CompiledTemplate::from_artifact(artifact));
        debug!(template = name, "registered template");
        self.templates.insert(name.to_string(), template.clone());
        Ok(template)
    }

    /// Register a component factory under `name`.
    pub fn register_component(
        &mut self,
        name: impl Into<String>,
        factory: Arc<dyn ComponentFactory>,
    ) {
        let name = name.into();
        debug!(component = %name, "registered component");
        self.components.insert(name, factory);
    }

    /// Look up a compiled template.
    pub fn template(&self, name: &str) -> Option<Arc<CompiledTemplate>> {
        self.templates.get(name).cloned()
    }

    /// Look up a component factory.
    pub fn component(&self, name: &str) -> Option<Arc<dyn ComponentFactory>> {
        self.components.get(name).cloned()
    }

    pub fn contains_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered template names, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Render a registered template.
    pub fn render(
        &self,
        name: &str,
        data: Option<&Value>,
        options: &RenderOptions,
    ) -> RuntimeResult<RenderResult> {
        let template = self
            .template(name)
            .ok_or_else(|| RuntimeError::TemplateNotFound(name.to_string()))?;
        template.render(self, data, options)
    }
}

impl std::fmt::Debug for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Namespace")
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .finish()
    }
}
