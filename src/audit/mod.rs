//! # Audit sink
//!
//! Structured operational events shipped to a remote log collector.
//!
//! The collector only accepts a fixed vocabulary, so stack, level and package
//! are enums. Raw strings coming from outside are parsed at the sink boundary
//! ([`AuditSink::log`]) and anything outside the allow-list is dropped with a
//! local warning instead of being sent.
//!
//! Emitting never fails and never blocks the caller. Delivery problems are
//! logged through `tracing` and forgotten.

mod http;
mod memory;

pub use http::*;
pub use memory::*;

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;

// =====================================
// Allow-lists
// =====================================
/// Which side of the system produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stack {
    Backend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Component that produced the event: the backend packages followed by the
/// ones common to every stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Package {
    // backend
    Cache,
    Controller,
    CronJob,
    Db,
    Domain,
    Handler,
    Repository,
    Route,
    Service,
    // common
    Auth,
    Config,
    Middleware,
    Utils,
}

impl Stack {
    pub const ALL: [Stack; 1] = [Stack::Backend];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Stack::Backend => "backend",
        }
    }
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

impl Package {
    pub const ALL: [Package; 13] = [
        Package::Cache,
        Package::Controller,
        Package::CronJob,
        Package::Db,
        Package::Domain,
        Package::Handler,
        Package::Repository,
        Package::Route,
        Package::Service,
        Package::Auth,
        Package::Config,
        Package::Middleware,
        Package::Utils,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Package::Cache => "cache",
            Package::Controller => "controller",
            Package::CronJob => "cron_job",
            Package::Db => "db",
            Package::Domain => "domain",
            Package::Handler => "handler",
            Package::Repository => "repository",
            Package::Route => "route",
            Package::Service => "service",
            Package::Auth => "auth",
            Package::Config => "config",
            Package::Middleware => "middleware",
            Package::Utils => "utils",
        }
    }
}

macro_rules! vocabulary {
    ($ty:ident, $kind:literal) => {
        impl FromStr for $ty {
            type Err = AuditError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .into_iter()
                    .find(|candidate| candidate.as_str() == s)
                    .ok_or_else(|| AuditError::NotAllowed {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

vocabulary!(Stack, "stack");
vocabulary!(Level, "level");
vocabulary!(Package, "package");

// =====================================
// Errors
// =====================================
/// Audit failures. These are logged locally and never leave the sink.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("{kind} '{value}' is not in the allow-list")]
    NotAllowed { kind: &'static str, value: String },

    #[error("audit transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("audit endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}

// =====================================
// Event
// =====================================
/// One structured event, exactly as posted to the collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub stack: Stack,
    pub level: Level,
    pub package: Package,
    pub message: String,
}

impl AuditEvent {
    /// Backend event.
    pub fn backend(level: Level, package: Package, message: impl Into<String>) -> Self {
        Self {
            stack: Stack::Backend,
            level,
            package,
            message: message.into(),
        }
    }

    /// Build an event from raw strings, enforcing the allow-list.
    ///
    /// # Errors
    /// [`AuditError::NotAllowed`] for the first value outside the allow-list.
    pub fn parse(
        stack: &str,
        level: &str,
        package: &str,
        message: impl Into<String>,
    ) -> Result<Self, AuditError> {
        Ok(Self {
            stack: stack.parse()?,
            level: level.parse()?,
            package: package.parse()?,
            message: message.into(),
        })
    }
}

// =====================================
// Sink trait
// =====================================
/// Destination for audit events.
///
/// `emit` must return promptly and must not fail; implementations that talk
/// to the network do so off the caller's path.
pub trait AuditSink: Send + Sync {
    fn emit(&self, event: AuditEvent);

    /// Emit from raw strings. Values outside the allow-list are dropped
    /// locally. Returns whether the event was handed to the sink.
    fn log(&self, stack: &str, level: &str, package: &str, message: &str) -> bool {
        match AuditEvent::parse(stack, level, package, message) {
            Ok(event) => {
                self.emit(event);
                true
            }
            Err(e) => {
                warn!(error = %e, "Dropping audit event");
                false
            }
        }
    }
}

/// Sink selected by the configuration: HTTP when an endpoint is set,
/// otherwise a no-op.
#[must_use]
pub fn sink_from_config(config: &Config) -> Arc<dyn AuditSink> {
    let Some(endpoint) = &config.audit_endpoint else {
        return Arc::new(NoopAuditSink);
    };

    match HttpAuditSink::new(endpoint, config.audit_token.clone(), config.audit_timeout()) {
        Ok(sink) => {
            info!(endpoint = sink.endpoint(), "Remote audit enabled");
            Arc::new(sink)
        }
        Err(e) => {
            warn!(error = %e, "Audit client could not be built, remote auditing disabled");
            Arc::new(NoopAuditSink)
        }
    }
}
