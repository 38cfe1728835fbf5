//! Shortcode to URL mapping.

use chrono::{DateTime, Duration, Utc};
use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    error::{AppError, Result},
    models::UrlRecord,
};

/// Owns the shortcode table.
///
/// Entries are never removed, so a shortcode stays reserved after it expires.
#[derive(Debug, Default)]
pub struct MappingStore {
    records: DashMap<String, UrlRecord>,
}

impl MappingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff nothing is stored under `code`, expired or not.
    #[must_use]
    pub fn is_available(&self, code: &str) -> bool {
        !self.records.contains_key(code)
    }

    /// Store a new record under `code`.
    ///
    /// Check and insert happen under one shard lock, so of two racing inserts
    /// for the same code exactly one succeeds.
    ///
    /// # Errors
    /// - `Conflict` if `code` is already present.
    /// - `Validation` if the expiry does not fit in the time range.
    pub fn insert(
        &self,
        code: &str,
        original_url: &str,
        created_at: DateTime<Utc>,
        validity_minutes: i64,
    ) -> Result<UrlRecord> {
        let expires_at = Duration::try_minutes(validity_minutes)
            .and_then(|validity| created_at.checked_add_signed(validity))
            .ok_or_else(|| {
                AppError::Validation(format!("Validity of {validity_minutes} minutes is out of range"))
            })?;

        match self.records.entry(code.to_string()) {
            Entry::Occupied(_) => Err(AppError::shortcode_taken(code)),
            Entry::Vacant(slot) => {
                let record = UrlRecord {
                    shortcode: code.to_string(),
                    original_url: original_url.to_string(),
                    created_at,
                    expires_at,
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    /// # Errors
    /// `NotFound` if `code` was never stored.
    pub fn get(&self, code: &str) -> Result<UrlRecord> {
        self.records
            .get(code)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| AppError::shortcode_not_found(code))
    }

    #[must_use]
    pub fn is_expired(record: &UrlRecord, now: DateTime<Utc>) -> bool {
        record.is_expired_at(now)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
