//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Page fetching and worker pool settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Dedup loop and termination policy
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Durable file locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Record boundary heuristic
    #[serde(default)]
    pub segmenter: SegmenterConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::validation("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::validation("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.workers == 0 {
            return Err(AppError::validation("scraper.workers must be > 0"));
        }
        if self.scraper.channel_capacity == 0 {
            return Err(AppError::validation(
                "scraper.channel_capacity must be > 0",
            ));
        }
        url::Url::parse(&self.scraper.source_url)?;
        Selector::parse(&self.scraper.row_selector)
            .map_err(|e| AppError::selector(&self.scraper.row_selector, format!("{e:?}")))?;

        if self.ingest.report_period_secs == 0 {
            return Err(AppError::validation(
                "ingest.report_period_secs must be > 0",
            ));
        }
        if self.ingest.duplicates_to_stop == 0 {
            return Err(AppError::validation(
                "ingest.duplicates_to_stop must be > 0",
            ));
        }

        if self.paths.fingerprint_file.as_os_str().is_empty() {
            return Err(AppError::validation("paths.fingerprint_file is empty"));
        }
        if self.paths.quotes_file.as_os_str().is_empty() {
            return Err(AppError::validation("paths.quotes_file is empty"));
        }
        Ok(())
    }
}

/// HTTP client and worker pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Page the quotes are scraped from
    #[serde(default = "defaults::source_url")]
    pub source_url: String,

    /// Number of concurrent scrape workers
    #[serde(default = "defaults::workers")]
    pub workers: usize,

    /// Pause after each fetch, per worker, in milliseconds
    #[serde(default = "defaults::fetch_interval")]
    pub fetch_interval_ms: u64,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// CSS selector for the row-like elements whose text is collected
    #[serde(default = "defaults::row_selector")]
    pub row_selector: String,

    /// Bound of the worker → ingest channel
    #[serde(default = "defaults::channel_capacity")]
    pub channel_capacity: usize,
}

impl ScraperConfig {
    pub fn fetch_interval(&self) -> Duration {
        Duration::from_millis(self.fetch_interval_ms)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            source_url: defaults::source_url(),
            workers: defaults::workers(),
            fetch_interval_ms: defaults::fetch_interval(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            row_selector: defaults::row_selector(),
            channel_capacity: defaults::channel_capacity(),
        }
    }
}

/// Ingest loop policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Interval after which the accepted counter is reset
    #[serde(default = "defaults::report_period")]
    pub report_period_secs: u64,

    /// Consecutive duplicates that end the run
    #[serde(default = "defaults::duplicates_to_stop")]
    pub duplicates_to_stop: u32,

    /// How long to wait for workers after the loop ends
    #[serde(default = "defaults::shutdown_grace")]
    pub shutdown_grace_ms: u64,
}

impl IngestConfig {
    pub fn report_period(&self) -> Duration {
        Duration::from_secs(self.report_period_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            report_period_secs: defaults::report_period(),
            duplicates_to_stop: defaults::duplicates_to_stop(),
            shutdown_grace_ms: defaults::shutdown_grace(),
        }
    }
}

/// Locations of the durable files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Append-only file of 16-byte fingerprints
    #[serde(default = "defaults::fingerprint_file")]
    pub fingerprint_file: PathBuf,

    /// Append-only output log
    #[serde(default = "defaults::quotes_file")]
    pub quotes_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            fingerprint_file: defaults::fingerprint_file(),
            quotes_file: defaults::quotes_file(),
        }
    }
}

/// Record boundary heuristic settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Marker inserted at detected boundaries
    #[serde(default = "defaults::separator")]
    pub separator: char,

    /// Capitals that never open a new title
    #[serde(default = "defaults::exempt_capitals")]
    pub exempt_capitals: String,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            separator: defaults::separator(),
            exempt_capitals: defaults::exempt_capitals(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Scraper defaults
    pub fn source_url() -> String {
        "https://confluence.hflabs.ru/pages/viewpage.action?pageId=1181220999#app-switcher".into()
    }
    pub fn workers() -> usize {
        2
    }
    pub fn fetch_interval() -> u64 {
        100
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; quotegrab/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn row_selector() -> String {
        "tr".into()
    }
    pub fn channel_capacity() -> usize {
        1
    }

    // Ingest defaults
    pub fn report_period() -> u64 {
        10
    }
    pub fn duplicates_to_stop() -> u32 {
        1
    }
    pub fn shutdown_grace() -> u64 {
        500
    }

    // Path defaults
    pub fn fingerprint_file() -> PathBuf {
        PathBuf::from("hash.bin")
    }
    pub fn quotes_file() -> PathBuf {
        PathBuf::from("quotes.txt")
    }

    // Segmenter defaults
    pub fn separator() -> char {
        '_'
    }
    pub fn exempt_capitals() -> String {
        ('A'..='Z').collect()
    }
}
