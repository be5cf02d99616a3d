//! Fixed-window counter algorithm.
//!
//! One evaluation performs exactly one store read and one store write.
//! No lock or transaction spans the two, so concurrent requests against
//! the same key can race (both read the same record, both decrement from
//! the same baseline, both write). The counts are best-effort, not exact;
//! callers must not rely on them being precise under contention.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::storage::CounterStore;

/// The persisted state of one counting window.
///
/// Serialized as `{"remaining": <int>, "created": <float>}`. The wire
/// format must round-trip exactly, including the fractional timestamp,
/// so that counters survive across processes where the store does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRecord {
    /// Requests left in the current window; goes negative once exceeded
    pub remaining: i64,
    /// Window start, seconds since the Unix epoch (fractional)
    pub created: f64,
}

/// Outcome of one window evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStatus {
    /// Residual budget after this request; negative means exceeded
    pub remaining: i64,
    /// Seconds until the window resets, tenth-of-a-second resolution
    pub reset_in: f64,
    /// Requests attributed to this window so far, including this one
    pub request_count: i64,
    /// Seconds elapsed since the window started, rounded to one decimal
    pub elapsed: f64,
}

impl WindowStatus {
    /// Whether the budget was already exhausted before this request and
    /// the window has not yet expired. Requests that roll the window over
    /// are always allowed because the budget was just replenished.
    pub fn is_exceeded(&self) -> bool {
        self.remaining < 0
    }
}

/// Evaluate one request against the window stored under `key`.
///
/// `max_requests` and `window_secs` must be positive; callers are expected
/// to skip evaluation entirely for disabled tiers rather than pass zero.
pub fn evaluate(
    store: &dyn CounterStore,
    key: &str,
    max_requests: i64,
    window_secs: i64,
) -> WindowStatus {
    evaluate_at(store, key, max_requests, window_secs, epoch_now())
}

/// Clock-injected variant of [`evaluate`].
///
/// `now` is sampled once by the caller and used for every time computation
/// in this evaluation.
pub fn evaluate_at(
    store: &dyn CounterStore,
    key: &str,
    max_requests: i64,
    window_secs: i64,
    now: f64,
) -> WindowStatus {
    // A missing or undecodable value means a fresh window; the current
    // request is charged against the new budget immediately. A decoded
    // record is decremented unconditionally, with no floor.
    let mut record = match store
        .get(key)
        .and_then(|raw| serde_json::from_str::<WindowRecord>(&raw).ok())
    {
        Some(mut record) => {
            record.remaining -= 1;
            record
        }
        None => WindowRecord {
            remaining: max_requests - 1,
            created: now,
        },
    };

    let mut reset_in = ((record.created + window_secs as f64 - now) * 10.0).ceil() / 10.0;
    let request_count = max_requests - record.remaining;
    let elapsed = ((now - record.created) * 10.0).round() / 10.0;

    if reset_in <= 0.0 {
        // Window expired: replenish the budget and report a full window
        // rather than the stale countdown.
        record.remaining = max_requests - 1;
        record.created = now;
        reset_in = window_secs as f64;
    }

    if let Ok(raw) = serde_json::to_string(&record) {
        store.set(key, &raw);
    }

    WindowStatus {
        remaining: record.remaining,
        reset_in,
        request_count,
        elapsed,
    }
}

/// Current time as fractional seconds since the Unix epoch.
fn epoch_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
