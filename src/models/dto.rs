//! # Data Transfer Objects
//!
//! DTOs not tied to a single entity.

use serde::{Deserialize, Serialize};

// =====================================
// Health Check
// =====================================
/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,

    /// Shortcodes reserved so far, expired ones included
    pub total_shortcodes: usize,
}

impl HealthResponse {
    #[must_use]
    pub fn healthy(total_shortcodes: usize) -> Self {
        Self {
            status: "healthy".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            total_shortcodes,
        }
    }
}
