//! # Configuration
//!
//! Settings are read from `SHORTURL_*` environment variables (a `.env` file
//! is honoured by `main`). Anything not set falls back to [`Config::default`].
//!
//! ## Concepts
//! - **`#[serde(default)]`**: missing fields are filled from `Default`, so
//!   the environment only needs to carry what differs.
//! - **`config` crate**: `Environment::with_prefix` maps `SHORTURL_PORT` to
//!   the `port` field; `try_parsing(true)` turns `"8080"` into a number.
//! - **Lenient enums**: `#[serde(from = "String")]` lets an unknown
//!   environment name fall back to development instead of failing startup.
//! - **Builder pattern**: [`ConfigBuilder`] builds a config in code, without
//!   touching process-wide variables.
//!
//! Loading and checking are separate steps. `from_env` only fails on values
//! it cannot parse; [`Config::validate`] then rejects values the service
//! cannot run with.
//!
//! ```rust,no_run
//! use shorturl::config::Config;
//!
//! let config = Config::from_env()?;
//! config.validate()?;
//! # Ok::<(), shorturl::AppError>(())
//! ```
//!
//! | Variable | Default |
//! |---|---|
//! | `SHORTURL_HOST` | `0.0.0.0` |
//! | `SHORTURL_PORT` | `8000` |
//! | `SHORTURL_PUBLIC_BASE_URL` | unset (derived from the request) |
//! | `SHORTURL_DEFAULT_VALIDITY_MINUTES` | `30` |
//! | `SHORTURL_MAX_GENERATION_ATTEMPTS` | `10` |
//! | `SHORTURL_AUDIT_ENDPOINT` | unset (audit disabled) |
//! | `SHORTURL_AUDIT_TOKEN` | unset |
//! | `SHORTURL_AUDIT_TIMEOUT_MS` | `5000` |
//! | `SHORTURL_LOG_FILE` | unset (stdout only) |
//! | `SHORTURL_ENVIRONMENT` | `development` |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Prefix shared by every environment variable.
pub const ENV_PREFIX: &str = "SHORTURL";

/// Application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,

    pub port: u16,

    /// Origin used for short links. When unset the origin of the incoming
    /// request is used instead.
    pub public_base_url: Option<String>,

    /// Validity applied when a creation request omits one.
    pub default_validity_minutes: u32,

    /// Upper bound on generator draws before an allocation gives up.
    pub max_generation_attempts: u32,

    /// Remote audit log endpoint. `None` disables remote auditing.
    pub audit_endpoint: Option<String>,

    /// Bearer token sent to the audit endpoint.
    pub audit_token: Option<String>,

    pub audit_timeout_ms: u64,

    /// Optional file that receives a copy of the local log.
    pub log_file: Option<String>,

    pub environment: Environment,
}

/// Deployment environment.
///
/// Parsing is lenient: anything unrecognised becomes `Development`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "testing" | "test" => Environment::Testing,
            _ => Environment::Development,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            public_base_url: None,
            default_validity_minutes: 30,
            max_generation_attempts: 10,
            audit_endpoint: None,
            audit_token: None,
            audit_timeout_ms: 5_000,
            log_file: None,
            environment: Environment::Development,
        }
    }
}

impl Config {
    /// Load settings from the process environment.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] when a variable cannot be parsed into
    /// its field type.
    pub fn from_env() -> Result<Self> {
        let source = ::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true);

        ::config::Config::builder()
            .add_source(source)
            .build()
            .and_then(|settings| settings.try_deserialize::<Self>())
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Check the settings for values the service cannot run with.
    ///
    /// # Errors
    /// Returns [`AppError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(AppError::Config("PORT cannot be 0".to_string()));
        }

        if self.default_validity_minutes == 0 {
            return Err(AppError::Config(
                "DEFAULT_VALIDITY_MINUTES must be at least 1".to_string(),
            ));
        }

        if self.max_generation_attempts == 0 {
            return Err(AppError::Config(
                "MAX_GENERATION_ATTEMPTS must be at least 1".to_string(),
            ));
        }

        if let Some(base) = &self.public_base_url {
            if !crate::utils::is_valid_url(base) {
                return Err(AppError::Config(format!(
                    "PUBLIC_BASE_URL '{base}' is not an http(s) URL"
                )));
            }
        }

        if let Some(endpoint) = &self.audit_endpoint {
            if !crate::utils::is_valid_url(endpoint) {
                return Err(AppError::Config(format!(
                    "AUDIT_ENDPOINT '{endpoint}' is not an http(s) URL"
                )));
            }

            if self.environment.is_production() && self.audit_token.is_none() {
                return Err(AppError::Config(
                    "AUDIT_TOKEN is required when AUDIT_ENDPOINT is set in production"
                        .to_string(),
                ));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn audit_timeout(&self) -> Duration {
        Duration::from_millis(self.audit_timeout_ms)
    }
}

// =====================================
// Builder Pattern
// =====================================
/// Fluent construction of a [`Config`], mostly for tests and embedding.
///
/// ```rust
/// use shorturl::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .port(8080)
///     .public_base_url("https://sho.rt")
///     .build();
/// assert_eq!(config.port, 8080);
/// ```
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    #[must_use]
    pub fn public_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.public_base_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn default_validity_minutes(mut self, minutes: u32) -> Self {
        self.config.default_validity_minutes = minutes;
        self
    }

    #[must_use]
    pub fn max_generation_attempts(mut self, attempts: u32) -> Self {
        self.config.max_generation_attempts = attempts;
        self
    }

    #[must_use]
    pub fn audit_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.audit_endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn audit_token(mut self, token: impl Into<String>) -> Self {
        self.config.audit_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn audit_timeout_ms(mut self, millis: u64) -> Self {
        self.config.audit_timeout_ms = millis;
        self
    }

    #[must_use]
    pub fn environment(mut self, env: Environment) -> Self {
        self.config.environment = env;
        self
    }

    #[must_use]
    pub fn build(self) -> Config {
        self.config
    }

    /// # Errors
    /// Fails when [`Config::validate`] does.
    pub fn build_validated(self) -> Result<Config> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
