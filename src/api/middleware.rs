//! # Middleware
//!
//! Request-scoped concerns that wrap every handler: timing plus audit of each
//! request, and the `X-Request-Id` correlation header.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header::HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::{info, warn};

use crate::{
    audit::{AuditEvent, Level, Package},
    services::AppState,
};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

// =====================================
// Request Logging Middleware
// =====================================
/// Time the request, log it and report it to the audit sink.
///
/// ```rust,ignore
/// let app = Router::new()
///     .layer(axum::middleware::from_fn_with_state(state.clone(), request_logging));
/// ```
pub async fn request_logging(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    let status = response.status();
    if status.is_server_error() {
        warn!(%method, %path, status = status.as_u16(), elapsed_ms, "Request failed");
    } else {
        info!(%method, %path, status = status.as_u16(), elapsed_ms, "Request completed");
    }

    state.audit.emit(AuditEvent::backend(
        Level::Info,
        Package::Route,
        format!("{method} {path} - {} - {elapsed_ms:.2}ms", status.as_u16()),
    ));

    response
}

// =====================================
// Request ID Middleware
// =====================================
/// Reuse the caller's `X-Request-Id` or mint one, and echo it on the response.
pub async fn request_id(mut request: Request<Body>, next: Next) -> Response {
    let id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
        .unwrap_or_else(|| nanoid::nanoid!(12));

    let value = HeaderValue::from_str(&id).ok();

    if let Some(value) = value.clone() {
        request.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let mut response = next.run(request).await;

    if let Some(value) = value {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
