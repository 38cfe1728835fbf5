//! # Error handling
//!
//! A single [`AppError`] enum covers every failure the service can report.
//!
//! ## Concepts
//! - **thiserror**: `#[derive(Error)]` writes `Display` and `std::error::Error`
//!   from the `#[error(...)]` attributes.
//! - **`#[from]`**: generates a `From` impl, so `?` on an `io::Result`
//!   converts into [`AppError::Io`] on its own.
//! - **Result alias**: [`Result<T>`] fixes the error type for the whole crate.
//! - **`IntoResponse`**: handlers return `Result<_, AppError>` and axum turns
//!   the error side into a JSON response.
//!
//! ## Status mapping
//!
//! | Variant | Status | Raised by |
//! |---|---|---|
//! | `Validation` | 422 | bad URL, validity or shortcode; malformed JSON |
//! | `Conflict` | 409 | requested shortcode already reserved |
//! | `NotFound` | 404 | unknown shortcode |
//! | `Gone` | 410 | redirect to an expired shortcode |
//! | `Internal`, `Server`, `Config`, `Io` | 500 | generator exhaustion, startup |
//!
//! A 500 body only ever says "Internal server error"; the detail goes to the
//! server log.
//!
//! ## What is not here
//!
//! Audit-sink failures never reach this type. The sink logs them through
//! `tracing` where they happen and the caller's result is unchanged.
//!
//! ```rust
//! use shorturl::error::AppError;
//!
//! let err = AppError::shortcode_taken("dup1");
//! assert_eq!(err.status_code().as_u16(), 409);
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

// =====================================
// Result Type Alias
// =====================================
/// Crate-wide result type.
pub type Result<T, E = AppError> = std::result::Result<T, E>;

// =====================================
// Custom Error Enum
// =====================================
/// Every error the service can produce.
#[derive(Debug, Error)]
pub enum AppError {
    // ----------------------------------------
    // Client errors (4xx)
    // ----------------------------------------

    /// Malformed URL, out-of-range validity, bad shortcode pattern - 422
    #[error("Validation error: {0}")]
    Validation(String),

    /// Shortcode already reserved - 409
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Shortcode never existed - 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// Shortcode existed but has expired - 410
    #[error("Gone: {0}")]
    Gone(String),

    // ----------------------------------------
    // Server errors (5xx)
    // ----------------------------------------

    /// Unexpected failure such as generator exhaustion - 500
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Listener / serve failure
    #[error("Server error: {0}")]
    Server(String),

    /// Invalid startup configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Gone(_) => StatusCode::GONE,

            Self::Internal(_)
            | Self::Server(_)
            | Self::Config(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    #[must_use]
    pub fn shortcode_not_found(shortcode: &str) -> Self {
        Self::NotFound(format!("Short URL '{shortcode}' not found"))
    }

    #[must_use]
    pub fn shortcode_taken(shortcode: &str) -> Self {
        Self::Conflict(format!("Shortcode '{shortcode}' already exists"))
    }

    #[must_use]
    pub fn shortcode_expired(shortcode: &str) -> Self {
        Self::Gone(format!("Short URL '{shortcode}' has expired"))
    }

    /// Message safe to show to a caller. Server errors never leak detail.
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

// =====================================
// Error Response DTO
// =====================================
/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Canonical reason, e.g. "Not Found"
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code: None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status_code = Some(status.as_u16());
        self
    }
}

// =====================================
// IntoResponse Implementation
// =====================================
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(error = %self, "Server error occurred");
        }

        let status = self.status_code();
        let body = ErrorResponse::new(
            status.canonical_reason().unwrap_or("Error"),
            self.public_message(),
        )
        .with_status(status);

        (status, Json(body)).into_response()
    }
}

// =====================================
// From Implementations
// =====================================
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
