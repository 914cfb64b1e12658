//! Deferred includes.
//!
//! A partial or component directive does not render inline; executing its
//! op mints a fresh id, records a [`DeferredInclude`] in the render's
//! side table, and appends a comment marker (`partial<id>` /
//! `component<id>`) to the markup. Tree assembly later resolves each
//! marker against the table.
//!
//! Ids come from one process-wide atomic counter so concurrent renders on
//! separate threads never collide; entries live for a single render and
//! must be consumed exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;
use trellis_engine::IncludeKind;

use crate::component::ComponentFactory;
use crate::template::CompiledTemplate;

static NEXT_INCLUDE_ID: AtomicU64 = AtomicU64::new(1);

fn next_include_id() -> u64 {
    NEXT_INCLUDE_ID.fetch_add(1, Ordering::Relaxed)
}

/// A not-yet-resolved include, keyed by marker id in the side table.
pub enum DeferredInclude {
    Partial {
        template: Arc<CompiledTemplate>,
        params: Option<Value>,
        export: Option<String>,
    },
    Component {
        factory: Arc<dyn ComponentFactory>,
        params: Option<Value>,
        export: Option<String>,
    },
}

impl DeferredInclude {
    pub fn kind(&self) -> IncludeKind {
        match self {
            DeferredInclude::Partial { .. } => IncludeKind::Partial,
            DeferredInclude::Component { .. } => IncludeKind::Component,
        }
    }
}

/// Side table of deferred includes for one render.
#[derive(Default)]
pub struct IncludeTable {
    entries: HashMap<u64, DeferredInclude>,
}

impl IncludeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an include under a freshly minted id.
    pub fn defer(&mut self, include: DeferredInclude) -> u64 {
        let id = next_include_id();
        trace!(id, kind = include.kind().marker_prefix(), "deferred include");
        self.entries.insert(id, include);
        id
    }

    /// Consume the entry for a marker id.
    pub fn take(&mut self, id: u64) -> Option<DeferredInclude> {
        self.entries.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The marker text for a deferred include.
pub(crate) fn marker_text(kind: IncludeKind, id: u64) -> String {
    format!("{}{}", kind.marker_prefix(), id)
}

/// Parse marker text of the form `partial<id>` / `component<id>`.
pub(crate) fn parse_marker(text: &str) -> Option<(IncludeKind, u64)> {
    for kind in [IncludeKind::Partial, IncludeKind::Component] {
        if let Some(digits) = text.strip_prefix(kind.marker_prefix()) {
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                return digits.parse().ok().map(|id| (kind, id));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::CompiledTemplate;
    use trellis_engine::Engine;

    fn some_template() -> Arc<CompiledTemplate> {
        let artifact = Engine::new().compile("t", "x").unwrap();
        Arc::new(CompiledTemplate::from_artifact(artifact))
    }

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut table = IncludeTable::new();
        let a = table.defer(DeferredInclude::Partial {
            template: some_template(),
            params: None,
            export: None,
        });
        let b = table.defer(DeferredInclude::Partial {
            template: some_template(),
            params: None,
            export: None,
        });
        assert!(b > a);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_take_consumes_exactly_once() {
        let mut table = IncludeTable::new();
        let id = table.defer(DeferredInclude::Partial {
            template: some_template(),
            params: None,
            export: Some("row".to_string()),
        });
        assert!(table.take(id).is_some());
        assert!(table.take(id).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_marker_text_roundtrip() {
        assert_eq!(marker_text(IncludeKind::Partial, 7), "partial7");
        assert_eq!(
            parse_marker("partial7"),
            Some((IncludeKind::Partial, 7))
        );
        assert_eq!(
            parse_marker("component12"),
            Some((IncludeKind::Component, 12))
        );
        assert_eq!(parse_marker("partial"), None);
        assert_eq!(parse_marker("partialx"), None);
        assert_eq!(parse_marker("note"), None);
    }
}
