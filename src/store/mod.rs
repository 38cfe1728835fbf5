//! # In-memory store
//!
//! Two tables, each owning its data behind a sharded lock:
//!
//! ```text
//! MappingStore   shortcode -> UrlRecord          insert-if-absent, never removed
//! ClickRecorder  shortcode -> Vec<ClickEvent>    append-only
//! ```
//!
//! Nothing here suspends; the only waiting is on a shard lock. Neither table
//! knows about the other. Keeping clicks tied to existing shortcodes is the
//! job of [`crate::services::ShortenerService`].

mod mapping;
mod clicks;

pub use mapping::*;
pub use clicks::*;
