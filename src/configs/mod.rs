//! # Configuration
//!
//! Layers built-in defaults, an optional local JSON file and `FNG_` environment
//! variables. The defaults alone reproduce the fixed scrape: CNN's page, read in
//! US Eastern time, with the transport's own timeout.

use arc_swap::ArcSwap;
use chrono_tz::Tz;
use figment::{Figment, providers::{Env, Format, Json, Serialized}};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::core::error::NgError;
use crate::loggers::LogLevel;

/// Page the scraper reads by default.
pub const DEFAULT_PAGE_URL: &str = "https://money.cnn.com/data/fear-and-greed/";

/// "All times are ET" according to the page footer.
pub const DEFAULT_TIME_ZONE: &str = "America/New_York";

/// Prefix for environment overrides, e.g. `FNG_TIMEOUT_SECS=10`.
pub const ENV_PREFIX: &str = "FNG_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub page_url: String,
    pub time_zone: String,
    pub timeout_secs: Option<u64>,
    pub log_level: LogLevel,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            page_url: DEFAULT_PAGE_URL.to_string(),
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            timeout_secs: None,
            log_level: LogLevel::Info,
        }
    }
}

impl ScrapeConfig {
    /// Resolves `time_zone` against the IANA database.
    pub fn zone(&self) -> Result<Tz, NgError> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|e| NgError::ConfigError(format!("Unknown time zone {:?}: {}", self.time_zone, e)))
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

pub struct ConfigManager {
    current: ArcSwap<ScrapeConfig>,
    source_info: String,
}

impl ConfigManager {
    /// DEFAULTS: built-in values merged with `FNG_` env vars.
    pub fn from_env() -> Result<Self, NgError> {
        let config = Self::extract(Figment::from(Serialized::defaults(ScrapeConfig::default())))?;
        Ok(Self {
            current: ArcSwap::from_pointee(config),
            source_info: "env".to_string(),
        })
    }

    /// LOCAL: defaults + file + `FNG_` env vars. Fails if file missing.
    pub fn get_local_config(path: &str) -> Result<Self, NgError> {
        if !std::path::Path::new(path).exists() {
            return Err(NgError::ConfigError(format!("Local file not found: {}", path)));
        }

        let config = Self::extract(
            Figment::from(Serialized::defaults(ScrapeConfig::default())).merge(Json::file(path)),
        )?;

        Ok(Self {
            current: ArcSwap::from_pointee(config),
            source_info: format!("local:{}", path),
        })
    }

    fn extract(base: Figment) -> Result<ScrapeConfig, NgError> {
        let config: ScrapeConfig = base
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| NgError::ConfigError(e.to_string()))?;

        // reject unknown zones at load time rather than at first scrape
        config.zone()?;
        Ok(config)
    }

    /// Replaces the held configuration, e.g. after a file change.
    pub fn replace(&self, config: ScrapeConfig) -> Result<(), NgError> {
        config.zone()?;
        self.current.store(Arc::new(config));
        Ok(())
    }

    pub fn get(&self) -> Arc<ScrapeConfig> {
        self.current.load_full()
    }

    pub fn source(&self) -> &str {
        &self.source_info
    }
}
