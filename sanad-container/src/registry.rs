//! Handler registry: the local key → handler-chain table of one container.
//!
//! Each key owns an ordered list of handlers. The first handler is the
//! primary one used by `get`; `get_all` walks the whole list.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::container::Container;
use crate::error::Result;
use crate::function::Instance;
use crate::key::DependencyKey;

/// Produces one resolution for a key, given the resolving container.
///
/// # Why `Arc` and not `Box`?
/// Handlers are cloned out of the table before being called so that a
/// handler can resolve further keys without the table being locked.
pub type Handler = Arc<dyn Fn(&Container) -> Result<Instance> + Send + Sync>;

/// Local entry table of one container.
#[derive(Default)]
pub(crate) struct Registry {
    entries: HashMap<DependencyKey, Vec<Handler>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `handler` to the entry for `key`, creating the entry.
    ///
    /// Returns the number of handlers now registered for the key.
    pub fn push(&mut self, key: DependencyKey, handler: Handler) -> usize {
        let entry = self.entries.entry(key.clone()).or_default();
        entry.push(handler);
        debug!(key = %key, handlers = entry.len(), "Registered handler");
        entry.len()
    }

    /// Removes the whole entry for `key`.
    pub fn remove(&mut self, key: &DependencyKey) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            debug!(key = %key, "Unregistered");
        }
        removed
    }

    /// The first handler registered for `key`.
    pub fn primary(&self, key: &DependencyKey) -> Option<Handler> {
        let handler = self.entries.get(key).and_then(|entry| entry.first().cloned());
        trace!(key = %key, found = handler.is_some(), "Local lookup");
        handler
    }

    /// Every handler registered for `key`, in registration order.
    pub fn all(&self, key: &DependencyKey) -> Option<Vec<Handler>> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &DependencyKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns the number of keys with an entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> Vec<DependencyKey> {
        self.entries.keys().cloned().collect()
    }
}
