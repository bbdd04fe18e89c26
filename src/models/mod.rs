// src/models/mod.rs

//! Domain models for the scraper.
//!
//! This module contains the configuration tree and the small value types
//! passed between the pipeline stages.

mod config;
mod fingerprint;
mod record;

// Re-export all public types
pub use config::{Config, IngestConfig, PathsConfig, ScraperConfig, SegmenterConfig};
pub use fingerprint::Fingerprint;
pub use record::Record;
