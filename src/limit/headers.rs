//! Response header reconciliation.
//!
//! Several limiter tiers can wrap the same request. The externally visible
//! headers must always reflect whichever single tier is currently the
//! tightest constraint, never an average and never simply the last tier
//! to run.

use axum::http::{HeaderMap, HeaderValue};

/// Residual budget reported to the client.
pub const HEADER_REMAIN: &str = "X-Gatehouse-Rate-Limit-Remain";

/// Seconds until the reported window resets, one decimal place.
pub const HEADER_RESET: &str = "X-Gatehouse-Rate-Limit-Reset";

/// Fold one tier's outcome into the response headers.
///
/// If a previously-run tier already recorded a strictly smaller remaining
/// budget, its values are kept; otherwise the new values overwrite.
pub fn reconcile(headers: &mut HeaderMap, remaining: i64, reset_in: f64) {
    let previous = headers
        .get(HEADER_REMAIN)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok());

    if let Some(previous) = previous {
        if headers.contains_key(HEADER_RESET) && remaining > previous {
            return;
        }
    }

    if let Ok(value) = HeaderValue::from_str(&remaining.to_string()) {
        headers.insert(HEADER_REMAIN, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("{:.1}", reset_in)) {
        headers.insert(HEADER_RESET, value);
    }
}
