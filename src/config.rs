//! Configuration management for Gatehouse.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

use crate::error::{GatehouseError, Result};

/// Main configuration for the Gatehouse service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatehouseConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration, one block per tier
    #[serde(default)]
    pub rate_limits: RateLimitsConfig,

    /// Applications known to the bearer-token resolver
    #[serde(default)]
    pub apps: Vec<AppEntry>,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().unwrap()
}

/// Settings for all three limiter tiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateLimitsConfig {
    /// Per-application tier
    #[serde(default)]
    pub app: TierSettings,

    /// Per-client-IP tier
    #[serde(default)]
    pub ip: TierSettings,

    /// Process-global tier
    #[serde(default)]
    pub global: TierSettings,
}

/// Settings for a single limiter tier.
///
/// A tier with `max_requests` or `window_secs` at zero is disabled and
/// passes requests through untouched. A tier with `active = false` still
/// counts and logs but never rejects or emits headers (dry-run).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TierSettings {
    /// Request budget per window; 0 disables the tier
    #[serde(default)]
    pub max_requests: i64,

    /// Window length in seconds; 0 disables the tier
    #[serde(default)]
    pub window_secs: i64,

    /// Whether denials are enforced or only observed
    #[serde(default)]
    pub active: bool,
}

impl TierSettings {
    /// Create settings for an enforcing tier.
    pub fn new(max_requests: i64, window_secs: i64, active: bool) -> Self {
        Self {
            max_requests,
            window_secs,
            active,
        }
    }

    /// Whether this tier is configured to run at all.
    pub fn enabled(&self) -> bool {
        self.max_requests > 0 && self.window_secs > 0
    }
}

/// A single application entry for the static token resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppEntry {
    /// Opaque application identifier
    pub id: i64,
    /// Human-readable application name
    pub name: String,
    /// Bearer token presented by the application
    pub token: String,
}

impl GatehouseConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| GatehouseError::Config(format!("Failed to parse config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_disabled() {
        let config = GatehouseConfig::default();
        assert!(!config.rate_limits.app.enabled());
        assert!(!config.rate_limits.ip.enabled());
        assert!(!config.rate_limits.global.enabled());
        assert!(config.apps.is_empty());
    }

    #[test]
    fn test_tier_enabled_requires_both_thresholds() {
        assert!(TierSettings::new(100, 60, true).enabled());
        assert!(!TierSettings::new(0, 60, true).enabled());
        assert!(!TierSettings::new(100, 0, true).enabled());
        // The active flag does not affect whether the tier runs
        assert!(TierSettings::new(100, 60, false).enabled());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
server:
  listen_addr: 0.0.0.0:9000
rate_limits:
  app:
    max_requests: 50
    window_secs: 10
    active: true
  ip:
    max_requests: 200
    window_secs: 60
  global:
    max_requests: 1000
    window_secs: 60
    active: true
apps:
  - id: 42
    name: portal
    token: secret-token
"#;
        let config = GatehouseConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.listen_addr.port(), 9000);
        assert_eq!(config.rate_limits.app.max_requests, 50);
        assert!(config.rate_limits.app.active);
        // ip tier defaults to dry-run when active is omitted
        assert!(config.rate_limits.ip.enabled());
        assert!(!config.rate_limits.ip.active);
        assert_eq!(config.apps.len(), 1);
        assert_eq!(config.apps[0].name, "portal");
    }

    #[test]
    fn test_parse_invalid_yaml_is_config_error() {
        let result = GatehouseConfig::from_yaml("rate_limits: [not, a, map]");
        assert!(matches!(
            result,
            Err(crate::error::GatehouseError::Config(_))
        ));
    }
}
