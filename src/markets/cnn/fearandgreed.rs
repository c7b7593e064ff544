//! # CNN Fear & Greed Index Service
//!
//! Scrapes the money.cnn.com Fear & Greed page: fetch the markup, extract the
//! readings, validate, and optionally download the needle image.
//!
//! ```no_run
//! # async fn demo() -> Result<(), fng_scrape_ng::NgError> {
//! let result = fng_scrape_ng::markets::cnn::fearandgreed::parse().await?;
//! println!("{} ({})", result.now.value, result.now.text);
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::configs::ScrapeConfig;
use crate::core::error::NgError;
use crate::loggers::{LogTarget, Logger, LoggerBuilder};
use crate::markets::cnn::extract::{CnnPageExtractor, Extractor};
use crate::markets::cnn::model::FearAndGreedResult;
use crate::markets::cnn::page::{CnnPage, RawDocument};
use crate::retrieve::ky_http::KyOptions;
use crate::{info, warn};

/// Service orchestrator for the Fear & Greed scrape.
pub struct FearAndGreed {
    /// Page and image client.
    page: CnnPage,
    /// Page-specific parsing.
    extractor: Box<dyn Extractor>,
    /// URL of the page to scrape.
    page_url: String,
    /// Zone the page's timestamps are written in.
    zone: Tz,
    /// Shared logger for diagnostic tracking.
    logger: Logger,
}

impl FearAndGreed {
    /// Creates a service for the default page and zone.
    ///
    /// # Arguments
    /// * `logger` - A [`Logger`] handle used for internal telemetry.
    pub fn new(logger: Logger) -> Self {
        Self {
            page: CnnPage::new(logger.clone()),
            extractor: Box::new(CnnPageExtractor::default()),
            page_url: crate::configs::DEFAULT_PAGE_URL.to_string(),
            zone: chrono_tz::America::New_York,
            logger,
        }
    }

    /// Creates a service from a loaded [`ScrapeConfig`].
    ///
    /// # Errors
    /// Returns [`NgError::ConfigError`] if the configured zone is unknown.
    pub fn with_config(logger: Logger, config: &ScrapeConfig) -> Result<Self, NgError> {
        let zone = config.zone()?;
        let options = KyOptions { timeout: config.timeout(), ..KyOptions::default() };
        logger.set_level(config.log_level);

        Ok(Self {
            page: CnnPage::new_with_opts(logger.clone(), Some(options)),
            extractor: Box::new(CnnPageExtractor::default()),
            page_url: config.page_url.clone(),
            zone,
            logger,
        })
    }

    /// Replaces the page extractor, e.g. after a layout change.
    pub fn with_extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractor = Box::new(extractor);
        self
    }

    /// Mutable access to the page client, for headers.
    pub fn page_mut(&mut self) -> &mut CnnPage {
        &mut self.page
    }

    pub fn page_url(&self) -> &str {
        &self.page_url
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Fetches the configured page.
    pub async fn fetch_document(&self) -> Result<RawDocument, NgError> {
        self.page.fetch_document(&self.page_url).await
    }

    /// Extracts and validates a result from `doc`, resolving the
    /// "Last updated" marker against `now`.
    ///
    /// The same document and `now` always give the same result.
    pub fn extract(&self, doc: &RawDocument, now: DateTime<Utc>) -> Result<FearAndGreedResult, NgError> {
        let outcome = self
            .extractor
            .extract(&doc.html, self.zone, now)
            .and_then(|partial| partial.validate());

        match &outcome {
            Ok(result) => info!(
                self.logger,
                "Fear & Greed extracted",
                "now" => result.now.value,
                "rating" => &result.now.text,
                "last_update" => result.last_update_date.to_rfc3339()
            ),
            Err(e) => warn!(
                self.logger,
                "Fear & Greed extraction failed",
                "url" => &doc.url,
                "error" => e.to_string()
            ),
        }
        outcome
    }

    /// Fetches, extracts and validates, resolving the marker against `now`.
    pub async fn parse_at(&self, now: DateTime<Utc>) -> Result<FearAndGreedResult, NgError> {
        let doc = self.fetch_document().await?;
        self.extract(&doc, now)
    }

    /// Fetches, extracts and validates using the current time.
    pub async fn parse(&self) -> Result<FearAndGreedResult, NgError> {
        let doc = self.fetch_document().await?;
        self.extract(&doc, Utc::now())
    }

    /// Downloads the needle image referenced by a validated result.
    pub async fn get_image_bytes(&self, result: &FearAndGreedResult) -> Result<Vec<u8>, NgError> {
        self.page.download_image(&result.image_url).await
    }
}

/// One-call scrape with default settings and no log output.
///
/// Must be called from within a tokio runtime.
pub async fn parse() -> Result<FearAndGreedResult, NgError> {
    let logger = LoggerBuilder::new("fear_and_greed")
        .with_target(LogTarget::Discard)
        .build()?;
    FearAndGreed::new(logger).parse().await
}
