//! # Health Check Handler

use axum::{extract::State, Json};

use crate::{models::HealthResponse, services::AppState};

/// `GET /health`
///
/// ```json
/// { "status": "healthy", "version": "0.1.0", "total_shortcodes": 3 }
/// ```
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.shortener.total_shortcodes()))
}
