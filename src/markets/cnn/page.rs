//! # CNN Page Client
//!
//! Fetches the Fear & Greed HTML page and the needle image it references.
//! Both calls are single GETs: a status other than `200` is an error, and the
//! response is dropped on every path so the connection goes back to the pool.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use crate::retrieve::ky_http::{KyHttp, KyOptions};
use crate::core::error::NgError;
use crate::loggers::Logger;
use crate::{info, warn};

/// Page markup as fetched, decoded as UTF-8.
///
/// DOM parsing happens inside the extractor; `scraper::Html` is not `Send`, so
/// the raw text is what travels across `.await` points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// The URL the markup was fetched from.
    pub url: String,
    /// The response body.
    pub html: String,
}

impl RawDocument {
    /// Wraps markup obtained some other way (a saved snapshot, a test fixture).
    pub fn from_html(url: &str, html: impl Into<String>) -> Self {
        Self { url: url.to_string(), html: html.into() }
    }

    /// Accepts a raw body. Invalid UTF-8 sequences become U+FFFD, the way a
    /// browser would show them; only an empty body is refused.
    pub fn from_bytes(url: &str, body: &[u8]) -> Result<Self, NgError> {
        if body.is_empty() {
            return Err(NgError::DocumentParseError(format!("Body of {} is empty", url)));
        }
        let html = String::from_utf8_lossy(body).into_owned();
        Ok(Self { url: url.to_string(), html })
    }
}

/// Adapter for the CNN page and image hosts.
///
/// No headers are sent by default; `set_header` exists for callers that need to
/// look like a browser.
pub struct CnnPage {
    /// Single-shot HTTP client.
    http: KyHttp,
    /// Shared logger for structured diagnostic events.
    logger: Logger,
    /// Headers attached to every request.
    headers: HeaderMap,
}

impl CnnPage {
    /// Creates a client with reqwest's default timeouts.
    pub fn new(logger: Logger) -> Self {
        Self::new_with_opts(logger, None)
    }

    /// Creates a client with explicit [`KyOptions`], e.g. a request deadline.
    pub fn new_with_opts(logger: Logger, options: Option<KyOptions>) -> Self {
        Self {
            http: KyHttp::new_with_opts(logger.clone(), options),
            logger,
            headers: HeaderMap::new(),
        }
    }

    /// Updates or adds a header sent with every request.
    /// Invalid names or values are ignored.
    pub fn set_header(&mut self, key: &str, value: &str) {
        if let Ok(name) = HeaderName::from_bytes(key.as_bytes()) {
            if let Ok(val) = HeaderValue::from_str(value) {
                self.headers.insert(name, val);
            }
        }
    }

    /// Returns a clone of the current header set.
    pub fn get_headers(&self) -> HeaderMap {
        self.headers.clone()
    }

    /// Fetches the page at `url`.
    ///
    /// # Errors
    /// * [`NgError::RequestBuildError`] / [`NgError::TransportError`] from the client.
    /// * [`NgError::HttpStatusError`] for any status other than `200`.
    /// * [`NgError::TransportError`] if the body cannot be read.
    /// * [`NgError::DocumentParseError`] if the body is empty.
    pub async fn fetch_document(&self, url: &str) -> Result<RawDocument, NgError> {
        let resp = self.http.get(url, self.get_headers()).await?;

        let status = resp.status();
        if status != StatusCode::OK {
            warn!(
                self.logger,
                "CNN page request failed",
                "url" => url,
                "status" => status.as_u16()
            );
            return Err(NgError::HttpStatusError {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| NgError::TransportError(format!("Reading body of {}: {}", url, e)))?;

        info!(self.logger, "CNN page fetched", "url" => url, "bytes" => body.len());
        RawDocument::from_bytes(url, &body)
    }

    /// Downloads the image at `url` and returns its raw bytes.
    ///
    /// # Errors
    /// * [`NgError::ImageDownloadError`] on transport failure or a non-200 status.
    /// * [`NgError::ImageReadError`] if the body cannot be read.
    pub async fn download_image(&self, url: &str) -> Result<Vec<u8>, NgError> {
        let resp = self.http.get(url, self.get_headers()).await.map_err(|e| {
            NgError::ImageDownloadError {
                url: url.to_string(),
                status: None,
                reason: e.to_string(),
            }
        })?;

        let status = resp.status();
        if status != StatusCode::OK {
            warn!(self.logger, "Image download failed", "url" => url, "status" => status.as_u16());
            return Err(NgError::ImageDownloadError {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: format!("non 200 response code: {}", status),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| NgError::ImageReadError(e.to_string()))?;

        info!(self.logger, "Image downloaded", "url" => url, "bytes" => bytes.len());
        Ok(bytes.to_vec())
    }
}
