//! Error types for the Gatehouse service.
//!
//! Errors here cover setup only (configuration loading, binding the demo
//! server). The limiter tiers themselves never fail a request: malformed
//! store values, missing configuration, and unsupported store capabilities
//! all degrade to passing the request through unthrottled.

use thiserror::Error;

/// Main error type for Gatehouse operations.
#[derive(Error, Debug)]
pub enum GatehouseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Gatehouse operations.
pub type Result<T> = std::result::Result<T, GatehouseError>;
