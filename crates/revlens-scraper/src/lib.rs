//! Product page access and review text extraction.
//!
//! [`PageClient`] downloads a page with browser-like headers; [`extract_reviews`]
//! walks the parsed document with a [`ReviewSelector`] and returns the trimmed,
//! non-empty review texts in document order.

pub mod client;
pub mod error;
pub mod extract;

pub use client::{parse_page_url, PageClient, RawPage};
pub use error::ScraperError;
pub use extract::{extract_reviews, ReviewSelector};
