//! In-memory counter store.

use dashmap::DashMap;

use super::CounterStore;

/// A volatile, process-local counter store.
///
/// Values live for the lifetime of the process and are never expired by
/// the store itself. This is the one implementation that satisfies the
/// low-latency precondition of the IP and global tiers.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: DashMap<String, String>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held. Primarily useful for tests.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CounterStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn is_low_latency(&self) -> bool {
        true
    }
}
