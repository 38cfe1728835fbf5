//! # Domain models
//!
//! - [`UrlRecord`]: one shortened URL, immutable once created.
//! - [`ClickEvent`]: one successful redirect.
//! - request/response DTOs for the HTTP surface.

mod url;
mod click;
mod dto;

pub use url::*;
pub use click::*;
pub use dto::*;
