//! # Utilities
//!
//! Shortcode/URL validation rules, the raw random-code primitive and the
//! injectable clock.

mod clock;

pub use clock::*;

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;

// =====================================
// Constants
// =====================================
/// Alphabet for generated shortcodes.
pub const SHORT_CODE_CHARS: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of generated shortcodes.
pub const DEFAULT_SHORT_CODE_LENGTH: usize = 8;

/// Words that are path segments of the router and therefore cannot be used as
/// shortcodes.
pub const RESERVED_SHORTCODES: &[&str] = &["shorturls", "health"];

/// Characters allowed in a user-supplied shortcode.
pub static VALID_SHORT_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid regex pattern"));

// =====================================
// Short Code Generation
// =====================================
/// Random code of `length` characters from [`SHORT_CODE_CHARS`].
///
/// ```rust
/// use shorturl::utils::{generate_short_code_with_length, DEFAULT_SHORT_CODE_LENGTH};
///
/// assert_eq!(generate_short_code_with_length(DEFAULT_SHORT_CODE_LENGTH).len(), 8);
/// ```
#[must_use]
pub fn generate_short_code_with_length(length: usize) -> String {
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..SHORT_CODE_CHARS.len());
            SHORT_CODE_CHARS[idx] as char
        })
        .collect()
}

// =====================================
// Validation Functions
// =====================================
#[must_use]
pub fn is_reserved_short_code(code: &str) -> bool {
    RESERVED_SHORTCODES.contains(&code)
}

/// Absolute `http`/`https` URL with a host.
#[must_use]
pub fn is_valid_url(url_str: &str) -> bool {
    normalize_url(url_str).is_some()
}

/// Canonical serialization of an absolute `http`/`https` URL.
///
/// The parser drops tabs and newlines and percent-encodes other control
/// and non-ASCII characters, so the result is always a valid header value.
///
/// ```rust
/// use shorturl::utils::normalize_url;
///
/// assert_eq!(normalize_url("HTTPS://Example.com").as_deref(), Some("https://example.com/"));
/// assert_eq!(normalize_url("ftp://example.com"), None);
/// ```
#[must_use]
pub fn normalize_url(url_str: &str) -> Option<String> {
    url::Url::parse(url_str)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
        .map(String::from)
}

/// Short link for `shortcode` under `origin`.
#[must_use]
pub fn short_link(origin: &str, shortcode: &str) -> String {
    format!("{}/{}", origin.trim_end_matches('/'), shortcode)
}
