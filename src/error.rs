// src/error.rs

//! Unified error handling for the scraper.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Fingerprint file could not be read or appended to
    #[error("Fingerprint store {path}: {source}")]
    Fingerprints {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Output log could not be opened or appended to
    #[error("Quote log {path}: {source}")]
    QuoteLog {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap an I/O failure on the fingerprint file.
    pub fn fingerprints(path: &Path, source: std::io::Error) -> Self {
        Self::Fingerprints {
            path: path.display().to_string(),
            source,
        }
    }

    /// Wrap an I/O failure on the quote log.
    pub fn quote_log(path: &Path, source: std::io::Error) -> Self {
        Self::QuoteLog {
            path: path.display().to_string(),
            source,
        }
    }
}
