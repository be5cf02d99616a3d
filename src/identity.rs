//! Application identity resolution.
//!
//! The limiter treats identity as an opaque lookup: a request either maps
//! to a known application or it does not. The per-application tier only
//! runs for recognized applications; the IP and global tiers use the
//! cheaper [`AppResolver::app_id_hint`] to enrich their denial logs
//! without touching any slow storage.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::HeaderMap;

use crate::config::AppEntry;

/// A resolved application principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    /// Opaque application identifier
    pub id: i64,
    /// Human-readable application name
    pub name: String,
}

/// Trait for resolving the application behind a request.
///
/// Implementations may need slower storage (a database lookup, a token
/// introspection call), which is why the per-application tier carries no
/// low-latency store requirement.
#[async_trait]
pub trait AppResolver: Send + Sync {
    /// Resolve the request to an application, or `None` if the request
    /// does not carry a recognized application identity.
    async fn resolve(&self, headers: &HeaderMap) -> Option<AppIdentity>;

    /// Best-effort application id from request headers alone, without any
    /// storage lookup. Used only to enrich IP/global denial logs.
    fn app_id_hint(&self, _headers: &HeaderMap) -> Option<i64> {
        None
    }
}

/// Resolver backed by a static bearer-token map from configuration.
#[derive(Debug, Default)]
pub struct StaticTokenResolver {
    by_token: HashMap<String, AppIdentity>,
}

impl StaticTokenResolver {
    /// Build a resolver from configured application entries.
    pub fn from_entries(entries: &[AppEntry]) -> Self {
        let by_token = entries
            .iter()
            .map(|e| {
                (
                    e.token.clone(),
                    AppIdentity {
                        id: e.id,
                        name: e.name.clone(),
                    },
                )
            })
            .collect();
        Self { by_token }
    }

    fn bearer_token(headers: &HeaderMap) -> Option<&str> {
        headers
            .get(axum::http::header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }
}

#[async_trait]
impl AppResolver for StaticTokenResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Option<AppIdentity> {
        let token = Self::bearer_token(headers)?;
        self.by_token.get(token).cloned()
    }

    fn app_id_hint(&self, headers: &HeaderMap) -> Option<i64> {
        let token = Self::bearer_token(headers)?;
        self.by_token.get(token).map(|app| app.id)
    }
}
