//! Per-shortcode click logs.

use dashmap::DashMap;

use crate::models::ClickEvent;

/// Append-only click sequences keyed by shortcode.
///
/// Does not check that a shortcode exists; callers record only after a
/// successful lookup.
#[derive(Debug, Default)]
pub struct ClickRecorder {
    clicks: DashMap<String, Vec<ClickEvent>>,
}

impl ClickRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` to the log of `code`, creating the log on first use.
    pub fn record(&self, code: &str, event: ClickEvent) {
        self.clicks.entry(code.to_string()).or_default().push(event);
    }

    /// Events for `code` in insertion order; empty when none were recorded.
    #[must_use]
    pub fn list(&self, code: &str) -> Vec<ClickEvent> {
        self.clicks
            .get(code)
            .map(|events| events.value().clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn count(&self, code: &str) -> usize {
        self.clicks.get(code).map_or(0, |events| events.len())
    }
}
