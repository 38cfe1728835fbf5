//! # Services
//!
//! ```text
//! ┌─────────────────┐
//! │    API Layer    │  axum handlers
//! ├─────────────────┤
//! │  Service Layer  │  ShortenerService + CodeGenerator
//! ├─────────────────┤
//! │   Store Layer   │  MappingStore, ClickRecorder
//! └─────────────────┘
//!         │
//!         └──────────► AuditSink (side effect, best effort)
//! ```

mod generator;
mod shortener;

pub use generator::*;
pub use shortener::*;

use std::sync::Arc;

use crate::{
    audit::{self, AuditSink},
    config::Config,
};

// =====================================
// Application State
// =====================================
/// State shared by every handler. Cloning only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,

    pub shortener: Arc<ShortenerService>,

    /// Same sink the shortener reports to; used by request middleware.
    pub audit: Arc<dyn AuditSink>,
}

impl AppState {
    /// State with the audit sink chosen by `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let audit = audit::sink_from_config(&config);
        Self::with_audit(config, audit)
    }

    /// State reporting to the given sink.
    #[must_use]
    pub fn with_audit(config: Config, audit: Arc<dyn AuditSink>) -> Self {
        let shortener = ShortenerService::new(&config, audit.clone());
        Self::from_parts(config, shortener, audit)
    }

    /// State around an already configured service (custom clock/generator).
    #[must_use]
    pub fn from_parts(config: Config, shortener: ShortenerService, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            config: Arc::new(config),
            shortener: Arc::new(shortener),
            audit,
        }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
