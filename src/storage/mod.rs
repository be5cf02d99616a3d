//! Counter storage abstraction.

mod memory;

pub use memory::InMemoryStore;

/// Trait for the key/value store backing the window counters.
///
/// The store holds opaque string values with no implicit expiry; all
/// lifetime management is done by the caller. Absence of a key means
/// "fresh window with full budget" to the window algorithm.
pub trait CounterStore: Send + Sync {
    /// Read the raw value for a key, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Write the raw value for a key, replacing any previous value.
    fn set(&self, key: &str, value: &str);

    /// Whether this store is a low-latency, process-local implementation.
    ///
    /// The per-IP and global tiers only run against a low-latency store,
    /// to keep slow or networked dependencies off the hot path of every
    /// request. The per-application tier has no such restriction.
    fn is_low_latency(&self) -> bool {
        false
    }
}
