//! # Shortener service
//!
//! Orchestrates the generator, the mapping store and the click recorder.
//!
//! Per shortcode the lifecycle is `Reserved -> Expired`, with no way back and
//! no deletion. Expired codes refuse redirects (`Gone`) but still answer
//! stats queries.
//!
//! Every operation emits exactly one audit event describing its outcome. The
//! event is emitted after all store locks are released.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::{
    audit::{AuditEvent, AuditSink, Level, Package},
    config::Config,
    error::{AppError, Result},
    models::{CreateShortUrlRequest, RequestContext, ShortUrlCreated, ShortUrlStats, UrlRecord},
    store::{ClickRecorder, MappingStore},
    utils::{self, Clock, SystemClock},
};

use super::{CodeGenerator, RandomCodeGenerator};

// =====================================
// Shortener Service
// =====================================
/// Shortcode lifecycle manager.
pub struct ShortenerService {
    mappings: MappingStore,
    clicks: ClickRecorder,
    generator: Arc<dyn CodeGenerator>,
    audit: Arc<dyn AuditSink>,
    clock: Arc<dyn Clock>,
    default_validity_minutes: i64,
    max_generation_attempts: u32,
}

impl ShortenerService {
    /// Service with a random generator and the system clock.
    #[must_use]
    pub fn new(config: &Config, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            mappings: MappingStore::new(),
            clicks: ClickRecorder::new(),
            generator: Arc::new(RandomCodeGenerator::default()),
            audit,
            clock: Arc::new(SystemClock),
            default_validity_minutes: i64::from(config.default_validity_minutes),
            max_generation_attempts: config.max_generation_attempts,
        }
    }

    #[must_use]
    pub fn with_generator(mut self, generator: Arc<dyn CodeGenerator>) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Create a short link for `request.url` under `origin`.
    ///
    /// # Errors
    /// - `Validation`: bad URL, validity or shortcode.
    /// - `Conflict`: the requested shortcode is taken (expired or not).
    /// - `Internal`: no free shortcode after the configured number of draws.
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub fn create(&self, request: CreateShortUrlRequest, origin: &str) -> Result<ShortUrlCreated> {
        let record = self
            .allocate(&request)
            .inspect_err(|e| self.audit_failure("Create", e))?;

        let shortlink = utils::short_link(origin, &record.shortcode);
        info!(shortcode = %record.shortcode, expires_at = %record.expires_at, "Created short URL");
        self.audit(
            Level::Info,
            Package::Service,
            format!("Created short URL: {shortlink} -> {}", record.original_url),
        );

        Ok(ShortUrlCreated {
            shortlink,
            expiry: record.expires_at,
        })
    }

    /// Target URL for `code`, recording one click.
    ///
    /// # Errors
    /// - `NotFound`: unknown shortcode.
    /// - `Gone`: the shortcode has expired; nothing is recorded.
    #[instrument(skip(self, ctx))]
    pub fn resolve(&self, code: &str, ctx: &RequestContext) -> Result<String> {
        let record = self
            .mappings
            .get(code)
            .inspect_err(|e| self.audit_failure("Redirect", e))?;

        let now = self.clock.now();
        if MappingStore::is_expired(&record, now) {
            warn!(shortcode = %code, "Expired shortcode accessed");
            let err = AppError::shortcode_expired(code);
            self.audit_failure("Redirect", &err);
            return Err(err);
        }

        self.clicks.record(code, ctx.click_at(now));

        self.audit(
            Level::Info,
            Package::Route,
            format!("Redirecting: {code} -> {}", record.original_url),
        );

        Ok(record.original_url)
    }

    /// Record and click history for `code`. Works after expiry.
    ///
    /// # Errors
    /// `NotFound` for an unknown shortcode.
    #[instrument(skip(self))]
    pub fn stats(&self, code: &str) -> Result<ShortUrlStats> {
        let record = self
            .mappings
            .get(code)
            .inspect_err(|e| self.audit_failure("Stats", e))?;

        let click_details = self.clicks.list(code);

        self.audit(
            Level::Info,
            Package::Service,
            format!("Retrieved stats for shortcode: {code}"),
        );

        Ok(ShortUrlStats {
            original_url: record.original_url,
            creation_date: record.created_at,
            expiry_date: record.expires_at,
            total_clicks: click_details.len(),
            click_details,
        })
    }

    /// Number of clicks recorded for `code`.
    #[must_use]
    pub fn click_count(&self, code: &str) -> usize {
        self.clicks.count(code)
    }

    /// Shortcodes reserved so far, expired ones included.
    #[must_use]
    pub fn total_shortcodes(&self) -> usize {
        self.mappings.len()
    }

    // -------------------------------------
    // Allocation
    // -------------------------------------

    fn allocate(&self, request: &CreateShortUrlRequest) -> Result<UrlRecord> {
        let url = validate_request(request)?;

        let validity = request.validity.unwrap_or(self.default_validity_minutes);
        let now = self.clock.now();

        match &request.shortcode {
            Some(code) => self.insert_requested(code, &url, now, validity),
            None => self.insert_generated(&url, now, validity),
        }
    }

    fn insert_requested(
        &self,
        code: &str,
        url: &str,
        now: DateTime<Utc>,
        validity: i64,
    ) -> Result<UrlRecord> {
        if !self.mappings.is_available(code) {
            return Err(AppError::shortcode_taken(code));
        }

        // a concurrent create may still win between the check and here;
        // the store reports that as Conflict too
        self.mappings.insert(code, url, now, validity)
    }

    fn insert_generated(&self, url: &str, now: DateTime<Utc>, validity: i64) -> Result<UrlRecord> {
        for attempt in 1..=self.max_generation_attempts {
            let code = self.generator.generate();

            if !self.mappings.is_available(&code) {
                debug!(attempt, shortcode = %code, "Generated shortcode collided");
                continue;
            }

            match self.mappings.insert(&code, url, now, validity) {
                Ok(record) => return Ok(record),
                Err(AppError::Conflict(_)) => {
                    debug!(attempt, shortcode = %code, "Generated shortcode lost a race");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Internal(format!(
            "Shortcode generator exhausted after {} attempts",
            self.max_generation_attempts
        )))
    }

    // -------------------------------------
    // Audit
    // -------------------------------------

    fn audit(&self, level: Level, package: Package, message: String) {
        self.audit.emit(AuditEvent::backend(level, package, message));
    }

    fn audit_failure(&self, operation: &str, err: &AppError) {
        let level = match err {
            AppError::Validation(_) | AppError::NotFound(_) | AppError::Gone(_) => Level::Warn,
            _ => Level::Error,
        };
        self.audit(level, Package::Handler, format!("{operation} failed: {err}"));
    }
}

/// Field rules from the request DTO, the http(s)-only URL rule and the
/// reserved shortcode list.
///
/// Returns the URL in its normalized serialization, which is what gets
/// stored and later sent back in `Location`.
fn validate_request(request: &CreateShortUrlRequest) -> Result<String> {
    request.validate()?;

    let url = utils::normalize_url(&request.url).ok_or_else(|| {
        AppError::Validation(
            "Invalid URL format: only absolute http(s) URLs are accepted".to_string(),
        )
    })?;

    if let Some(code) = request.shortcode.as_deref().filter(|c| utils::is_reserved_short_code(c)) {
        return Err(AppError::Validation(format!("Shortcode '{code}' is reserved")));
    }

    Ok(url)
}
