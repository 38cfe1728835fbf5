//! # shorturl
//!
//! In-memory URL shortening service: time-limited shortcodes, redirect click
//! analytics and best-effort remote audit logging.
//!
//! ## Layout
//!
//! ```text
//! src/
//! ├── lib.rs          # library root
//! ├── main.rs         # binary: config, logging, serve
//! ├── config/         # settings from SHORTURL_* variables
//! ├── error/          # AppError and its HTTP mapping
//! ├── models/         # records, click events and DTOs
//! ├── store/          # concurrent mapping store and click recorder
//! ├── audit/          # audit vocabulary and sinks
//! ├── services/       # shortener service and shared state
//! ├── api/            # axum router, extractors, middleware, handlers
//! └── utils/          # validation rules, code generation, clock
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use shorturl::{api::create_router, config::Config, services::AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let addr = config.server_addr();
//!     let app = create_router(AppState::new(config));
//!     let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod config;

pub mod error;

pub mod models;

pub mod store;

/// Audit event vocabulary and the sinks that deliver it.
pub mod audit;

pub mod services;

pub mod api;

pub mod utils;

// =====================================
// Re-exports
// =====================================
pub use error::Result;

pub use error::AppError;

// =====================================
// Prelude Module
// =====================================
/// Frequently used items in one import.
///
/// ```rust
/// use shorturl::prelude::*;
/// ```
pub mod prelude {
    pub use crate::audit::{AuditEvent, AuditSink};
    pub use crate::config::Config;
    pub use crate::error::{AppError, Result};
    pub use crate::models::*;
    pub use crate::services::*;
}
