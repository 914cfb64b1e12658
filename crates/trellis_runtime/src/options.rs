//! Render options.

use crate::component::Component;
use crate::eval::Evaluator;

/// Callback invoked with a component instance around its insertion.
pub type ComponentHook = Box<dyn Fn(&dyn Component)>;

/// Options for one render invocation.
#[derive(Default)]
pub struct RenderOptions {
    before_append_component: Option<ComponentHook>,
    after_append_component: Option<ComponentHook>,
    evaluator: Option<Box<dyn Evaluator>>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke a callback on each component instance before its container
    /// is attached.
    pub fn before_append_component(mut self, hook: impl Fn(&dyn Component) + 'static) -> Self {
        self.before_append_component = Some(Box::new(hook));
        self
    }

    /// Invoke a callback on each component instance after its container
    /// is attached.
    pub fn after_append_component(mut self, hook: impl Fn(&dyn Component) + 'static) -> Self {
        self.after_append_component = Some(Box::new(hook));
        self
    }

    /// Replace the default path evaluator for this render.
    pub fn with_evaluator(mut self, evaluator: impl Evaluator + 'static) -> Self {
        self.evaluator = Some(Box::new(evaluator));
        self
    }

    pub(crate) fn before_hook(&self) -> Option<&ComponentHook> {
        self.before_append_component.as_ref()
    }

    pub(crate) fn after_hook(&self) -> Option<&ComponentHook> {
        self.after_append_component.as_ref()
    }

    pub(crate) fn evaluator(&self) -> Option<&dyn Evaluator> {
        self.evaluator.as_deref()
    }
}
