use std::sync::Arc;

use dashmap::DashMap;

use crate::dispatch::handler::Handler;

/// Message type -> ordered handler list.
///
/// Append-only. Readers take a snapshot of the list so no shard lock is
/// held while a handler runs.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: DashMap<String, Vec<Arc<dyn Handler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }

    /// Append `handler`; duplicates are kept and each runs.
    pub fn register(&self, message_type: impl Into<String>, handler: Arc<dyn Handler>) {
        self.handlers
            .entry(message_type.into())
            .or_default()
            .push(handler);
    }

    /// All handlers for a type, in registration order.
    pub fn handlers_for(&self, message_type: &str) -> Vec<Arc<dyn Handler>> {
        self.handlers
            .get(message_type)
            .map(|e| e.value().clone())
            .unwrap_or_default()
    }

    /// The handler `invoke` uses.
    pub fn first(&self, message_type: &str) -> Option<Arc<dyn Handler>> {
        self.handlers
            .get(message_type)
            .and_then(|e| e.value().first().cloned())
    }

    pub fn registered_types(&self) -> Vec<String> {
        let mut out: Vec<String> = self.handlers.iter().map(|e| e.key().clone()).collect();
        out.sort();
        out
    }
}
