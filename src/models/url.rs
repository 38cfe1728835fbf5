//! # URL model
//!
//! The stored record plus the DTOs of the creation endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// =====================================
// URL Entity
// =====================================
/// One shortened URL.
///
/// Records are never mutated. A record whose `expires_at` lies in the past is
/// expired but keeps its shortcode reserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlRecord {
    pub shortcode: String,

    pub original_url: String,

    pub created_at: DateTime<Utc>,

    pub expires_at: DateTime<Utc>,
}

impl UrlRecord {
    /// `now > expires_at`. The expiry instant itself is still valid.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

// =====================================
// API Request DTOs
// =====================================
/// Body of `POST /shorturls`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShortUrlRequest {
    /// Target URL
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Lifetime in minutes. The service default applies when omitted.
    #[validate(range(min = 1, message = "Validity must be at least 1 minute"))]
    #[serde(default)]
    pub validity: Option<i64>,

    /// Requested shortcode
    #[validate(
        length(min = 4, max = 10, message = "Shortcode must be 4-10 characters"),
        regex(
            path = *crate::utils::VALID_SHORT_CODE,
            message = "Shortcode may only contain letters, digits, '_' and '-'"
        )
    )]
    #[serde(default)]
    pub shortcode: Option<String>,
}

impl CreateShortUrlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            validity: None,
            shortcode: None,
        }
    }

    #[must_use]
    pub fn validity(mut self, minutes: i64) -> Self {
        self.validity = Some(minutes);
        self
    }

    #[must_use]
    pub fn shortcode(mut self, code: impl Into<String>) -> Self {
        self.shortcode = Some(code.into());
        self
    }
}

// =====================================
// API Response DTOs
// =====================================
/// Body of a `201` from `POST /shorturls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrlCreated {
    pub shortlink: String,
    pub expiry: DateTime<Utc>,
}
