//! The three limiter tiers, as axum middleware.
//!
//! Each tier checks its gating precondition, reads its settings, evaluates
//! the window algorithm under its own key, and folds the outcome into the
//! response headers. Denials are logged unconditionally; the `429`
//! short-circuit and the headers are emitted only when the tier is active.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::info;

use super::headers::reconcile;
use super::window::evaluate;
use super::RateLimitState;

const KEY_PREFIX_APP: &str = "rate_limit_app";
const KEY_PREFIX_IP: &str = "rate_limit_ip";
const KEY_GLOBAL: &str = "rate_limit_global";

/// Per-application tier.
///
/// Runs only for requests that resolve to a known application; everything
/// else passes through uncounted. Identity resolution may itself need slow
/// storage, so this tier carries no low-latency store requirement.
pub async fn app_rate_limit(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(app) = state.resolver().resolve(request.headers()).await else {
        return next.run(request).await;
    };

    let settings = state.limits().app;
    if !settings.enabled() {
        return next.run(request).await;
    }

    let key = format!("{}_{}", KEY_PREFIX_APP, app.id);
    let status = evaluate(
        state.store(),
        &key,
        settings.max_requests,
        settings.window_secs,
    );

    let mut response = if status.is_exceeded() {
        info!(
            app_id = app.id,
            app_name = %app.name,
            requests = status.request_count,
            elapsed_secs = status.elapsed,
            "Application rate limit exceeded"
        );
        if settings.active {
            deny(format!(
                "Application rate limit exceeded with {} requests in {} seconds.",
                status.request_count, status.elapsed
            ))
        } else {
            next.run(request).await
        }
    } else {
        next.run(request).await
    };

    if settings.active {
        reconcile(response.headers_mut(), status.remaining, status.reset_in);
    }
    response
}

/// Per-client-IP tier.
///
/// Refuses to run against anything but a low-latency store: this tier sits
/// on the hot path of every request, including ones that would otherwise
/// never touch a slow dependency.
pub async fn ip_rate_limit(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.store().is_low_latency() {
        return next.run(request).await;
    }

    let settings = state.limits().ip;
    if !settings.enabled() {
        return next.run(request).await;
    }

    let ip = client_address(&request);
    let key = format!("{}_{}", KEY_PREFIX_IP, normalize_address(&ip));
    let status = evaluate(
        state.store(),
        &key,
        settings.max_requests,
        settings.window_secs,
    );

    let mut response = if status.is_exceeded() {
        let app_id = state.resolver().app_id_hint(request.headers());
        info!(
            ip = %ip,
            app_id = app_id,
            requests = status.request_count,
            elapsed_secs = status.elapsed,
            "IP rate limit exceeded"
        );
        if settings.active {
            deny(format!(
                "IP rate limit exceeded with {} requests in {} seconds.",
                status.request_count, status.elapsed
            ))
        } else {
            next.run(request).await
        }
    } else {
        next.run(request).await
    };

    if settings.active {
        reconcile(response.headers_mut(), status.remaining, status.reset_in);
    }
    response
}

/// Process-global tier.
///
/// Counts every request under one fixed key, with the same low-latency
/// store requirement as the per-IP tier.
pub async fn global_rate_limit(
    State(state): State<RateLimitState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.store().is_low_latency() {
        return next.run(request).await;
    }

    let settings = state.limits().global;
    if !settings.enabled() {
        return next.run(request).await;
    }

    let status = evaluate(
        state.store(),
        KEY_GLOBAL,
        settings.max_requests,
        settings.window_secs,
    );

    let mut response = if status.is_exceeded() {
        let ip = client_address(&request);
        let app_id = state.resolver().app_id_hint(request.headers());
        info!(
            ip = %ip,
            app_id = app_id,
            requests = status.request_count,
            elapsed_secs = status.elapsed,
            "Global rate limit exceeded"
        );
        if settings.active {
            deny(format!(
                "Global rate limit exceeded with {} requests in {} seconds.",
                status.request_count, status.elapsed
            ))
        } else {
            next.run(request).await
        }
    } else {
        next.run(request).await
    };

    if settings.active {
        reconcile(response.headers_mut(), status.remaining, status.reset_in);
    }
    response
}

fn deny(body: String) -> Response {
    (StatusCode::TOO_MANY_REQUESTS, body).into_response()
}

/// Client address from forwarded headers, falling back to the peer address.
fn client_address(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
    {
        return real_ip.trim().to_string();
    }

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    "unknown".to_string()
}

/// Strip separator characters so the address can be embedded in a store key.
fn normalize_address(addr: &str) -> String {
    addr.chars()
        .filter(|c| !matches!(c, '.' | ':' | ','))
        .collect()
}
