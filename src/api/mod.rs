//! # HTTP layer
//!
//! Thin axum wrapper around [`ShortenerService`](crate::services::ShortenerService).
//!
//! ## Routes
//! - `POST /shorturls` - create a short link
//! - `GET /shorturls/:shortcode` - click statistics
//! - `GET /:shortcode` - redirect to the original URL
//! - `GET /health` - liveness

mod handlers;
mod middleware;
mod extractors;

pub use handlers::*;
pub use middleware::*;
pub use extractors::*;

use std::time::Duration;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::services::AppState;

// =====================================
// Router Builder
// =====================================
/// Build the application router around `state`.
///
/// The static segments here are listed in
/// [`RESERVED_SHORTCODES`](crate::utils::RESERVED_SHORTCODES) so no
/// shortcode can be shadowed by them.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/shorturls", post(handlers::shorturl::create_short_url))
        .route("/shorturls/:shortcode", get(handlers::shorturl::get_stats))
        .route("/health", get(handlers::health::health_check))
        .route("/:shortcode", get(handlers::shorturl::redirect))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::request_logging,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(axum_middleware::from_fn(middleware::request_id))
        .with_state(state)
}
