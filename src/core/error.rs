//! # Core Error Module
//!
//! This module defines the central `NgError` type used throughout the library.
//! It leverages `thiserror` for error message formatting and `serde` for serialization.

use serde::Serialize;
use thiserror::Error;

/// Central error type for the `fng_scrape_ng` library.
///
/// Every variant means "do not trust the payload". Nothing in the crate
/// retries or salvages a partial result.
#[derive(Debug, Error, Serialize)]
pub enum NgError {
    /// Error related to configuration loading or merging.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The outbound request could not be constructed (usually a malformed URL).
    #[error("Request build error: {0}")]
    RequestBuildError(String),

    /// Network-level failure reaching the host (DNS, connect, TLS, timeout, body read).
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The page responded with anything other than `200 OK`.
    #[error("HTTP status error from {url}: {status} {reason}")]
    HttpStatusError {
        /// The target URL that was requested.
        url: String,
        /// The HTTP status code received.
        status: u16,
        /// Canonical reason phrase for the status, if known.
        reason: String,
    },

    /// The response body was empty, so there is no markup to parse.
    #[error("Document parse error: {0}")]
    DocumentParseError(String),

    /// A list item did not have the `<number> (<label>)` shape.
    #[error("Text parse error at item {position}: {text:?}")]
    TextParseError {
        /// Zero-based position of the offending list item.
        position: usize,
        /// The item text as found on the page.
        text: String,
    },

    /// The indicator list did not hold the expected number of items.
    #[error("Expected {expected} indicator items, found {found}")]
    ItemCountError {
        /// Number of items the page layout is known to carry.
        expected: usize,
        /// Number of items actually present.
        found: usize,
    },

    /// Extraction finished but required fields are missing or zero.
    /// This is what a markup change on the source page usually looks like.
    #[error("Empty fields after extraction: {}", fields.join(", "))]
    EmptyFieldError {
        /// Names of the fields that failed validation.
        fields: Vec<String>,
    },

    /// The image request failed or returned a non-200 status.
    #[error("Image download failed for {url}: {reason}")]
    ImageDownloadError {
        /// The image URL that was requested.
        url: String,
        /// HTTP status, absent when the failure was at the transport level.
        status: Option<u16>,
        /// Human readable cause.
        reason: String,
    },

    /// The image response body could not be read.
    #[error("Reading image bytes failed: {0}")]
    ImageReadError(String),
}
