//! # Click analytics model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location stored when the transport could not tell where a click came from.
pub const UNKNOWN_LOCATION: &str = "unknown";

/// One resolved redirect. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub timestamp: DateTime<Utc>,

    /// `Referer` header of the redirect request
    pub referrer: Option<String>,

    /// Client network origin, best effort
    pub location: Option<String>,
}

/// What the transport knows about a redirect request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub referrer: Option<String>,
    pub location: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn new(referrer: Option<String>, location: Option<String>) -> Self {
        Self { referrer, location }
    }

    /// Build the click for this request at `timestamp`.
    #[must_use]
    pub fn click_at(&self, timestamp: DateTime<Utc>) -> ClickEvent {
        ClickEvent {
            timestamp,
            referrer: self.referrer.clone(),
            location: Some(
                self.location
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            ),
        }
    }
}

/// Body of `GET /shorturls/:shortcode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortUrlStats {
    pub original_url: String,
    pub creation_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub total_clicks: usize,
    pub click_details: Vec<ClickEvent>,
}
