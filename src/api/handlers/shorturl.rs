//! # Short URL Handlers
//!
//! Each handler extracts what it needs, calls
//! [`ShortenerService`](crate::services::ShortenerService) and shapes the
//! response. Errors render through [`AppError`](crate::error::AppError).

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use tracing::info;

use crate::{
    api::extractors::{ClientIp, JsonBody, Referrer, RequestOrigin},
    error::Result,
    models::{CreateShortUrlRequest, RequestContext, ShortUrlStats},
    services::AppState,
};

// =====================================
// Create Short URL
// =====================================
/// `POST /shorturls`
///
/// # Request Body
/// ```json
/// { "url": "https://example.com/long", "validity": 30, "shortcode": "abcd" }
/// ```
///
/// # Response
/// `201 Created`
/// ```json
/// { "shortlink": "http://localhost:8000/abcd", "expiry": "2025-01-01T00:30:00Z" }
/// ```
pub async fn create_short_url(
    State(state): State<AppState>,
    RequestOrigin(origin): RequestOrigin,
    JsonBody(request): JsonBody<CreateShortUrlRequest>,
) -> Result<impl IntoResponse> {
    let created = state.shortener.create(request, &origin)?;

    Ok((StatusCode::CREATED, Json(created)))
}

// =====================================
// Redirect
// =====================================
/// `GET /:shortcode`
///
/// - 307 to the original URL, recording one click
/// - 404 for an unknown shortcode
/// - 410 once the shortcode has expired
pub async fn redirect(
    State(state): State<AppState>,
    Path(shortcode): Path<String>,
    ClientIp(location): ClientIp,
    Referrer(referrer): Referrer,
) -> Result<Redirect> {
    let ctx = RequestContext::new(referrer, location);
    let target = state.shortener.resolve(&shortcode, &ctx)?;

    info!(shortcode = %shortcode, "Redirecting");

    Ok(Redirect::temporary(&target))
}

// =====================================
// Statistics
// =====================================
/// `GET /shorturls/:shortcode`
///
/// Still answers after the shortcode has expired.
pub async fn get_stats(
    State(state): State<AppState>,
    Path(shortcode): Path<String>,
) -> Result<Json<ShortUrlStats>> {
    Ok(Json(state.shortener.stats(&shortcode)?))
}
