//! Error types for qsift operations.
//!
//! This module defines the main error type [`QsiftError`] which represents
//! all possible errors that can occur during article fetching and markup
//! handling.
//!
//! Two failure classes from the overall design are deliberately *not* errors:
//! an unresolvable item link is modeled as `Option::None` by the
//! canonicalizer (the item is skipped), and a missing content container is
//! modeled as a fail-open sentinel metrics record by the extractor. Both
//! degrade toward "leave the article visible" rather than propagating.

use thiserror::Error;

/// Main error type for the fetch/score pipeline.
///
/// Every variant maps to "leave the item visible": a failed fetch is never
/// cached, its in-flight entry is cleared, and a later scan may retry.
///
/// # Example
///
/// ```rust
/// use qsift_core::QsiftError;
///
/// let err = QsiftError::Timeout { timeout_ms: 10_000 };
/// assert!(err.to_string().contains("10000"));
/// ```
#[derive(Error, Debug)]
pub enum QsiftError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures, connection issues, and other
    /// transport-level problems.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    ///
    /// The original page was reachable but answered outside 2xx. Treated
    /// the same as a transport failure by the pipeline.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Request timeout.
    ///
    /// Returned when a fetch exceeds its per-request deadline. The
    /// underlying request future is dropped, which cancels it.
    #[error("Request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed or is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors.
    ///
    /// Returned when a CSS selector used by the extractor is invalid.
    /// Malformed markup itself never errors; `scraper` parses leniently.
    #[error("Failed to parse HTML: {0}")]
    HtmlParse(String),
}

/// Result type alias for QsiftError.
///
/// This is a convenience alias for `std::result::Result<T, QsiftError>`.
pub type Result<T> = std::result::Result<T, QsiftError>;
