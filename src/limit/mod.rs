//! Rate limiting pipeline: shared state, window algorithm, limiter tiers,
//! and response header reconciliation.

mod headers;
mod middleware;
mod window;

pub use headers::{reconcile, HEADER_REMAIN, HEADER_RESET};
pub use middleware::{app_rate_limit, global_rate_limit, ip_rate_limit};
pub use window::{evaluate, evaluate_at, WindowRecord, WindowStatus};

use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::RateLimitsConfig;
use crate::identity::AppResolver;
use crate::storage::CounterStore;

/// Shared state for the limiter tiers.
///
/// The limits snapshot is replaced only through [`RateLimitState::reload`];
/// tiers read a consistent copy per request and never cache it themselves.
#[derive(Clone)]
pub struct RateLimitState {
    store: Arc<dyn CounterStore>,
    resolver: Arc<dyn AppResolver>,
    limits: Arc<RwLock<RateLimitsConfig>>,
}

impl RateLimitState {
    /// Create shared state from a counter store, an application resolver,
    /// and the initial per-tier limits.
    pub fn new(
        store: Arc<dyn CounterStore>,
        resolver: Arc<dyn AppResolver>,
        limits: RateLimitsConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            limits: Arc::new(RwLock::new(limits)),
        }
    }

    /// The counter store backing all tiers.
    pub fn store(&self) -> &dyn CounterStore {
        self.store.as_ref()
    }

    /// The application identity resolver.
    pub fn resolver(&self) -> &dyn AppResolver {
        self.resolver.as_ref()
    }

    /// A copy of the current per-tier limits.
    pub fn limits(&self) -> RateLimitsConfig {
        self.limits.read().clone()
    }

    /// Replace the per-tier limits for all subsequent requests.
    pub fn reload(&self, limits: RateLimitsConfig) {
        *self.limits.write() = limits;
    }
}
