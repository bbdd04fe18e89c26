// src/pipeline/run.rs

//! Scrape → dedupe → segment → persist.

use std::future::Future;
use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::ingest::{IngestLoop, IngestOutcome};
use crate::pipeline::workers::{PoolSettings, ScrapeWorkerPool};
use crate::services::{PageSource, TextSegmenter};
use crate::storage::{FingerprintStore, QuoteLog};

/// Run the scraper until the duplicate threshold, an interrupt, or a fatal
/// storage error.
///
/// Both durable files stay open for exactly the lifetime of the ingest loop.
pub async fn run_scraper<F>(
    config: &Config,
    source: Arc<dyn PageSource>,
    interrupt: F,
) -> Result<IngestOutcome>
where
    F: Future<Output = ()>,
{
    let store = FingerprintStore::open(&config.paths.fingerprint_file).await?;
    let log = QuoteLog::open(&config.paths.quotes_file).await?;
    let segmenter = Arc::new(TextSegmenter::from_config(&config.segmenter));

    let settings = PoolSettings {
        workers: config.scraper.workers,
        interval: config.scraper.fetch_interval(),
        channel_capacity: config.scraper.channel_capacity,
    };
    let (pool, mut blobs) = ScrapeWorkerPool::start(source, Arc::clone(&segmenter), &settings);
    let stats = pool.stats();

    let ingest = IngestLoop::new(store, log, segmenter, Arc::clone(&stats), &config.ingest);
    let outcome = match ingest {
        Ok(ingest) => ingest.run(&mut blobs, interrupt).await,
        Err(e) => Err(e),
    };

    drop(blobs);
    pool.shutdown(config.ingest.shutdown_grace()).await;
    log::debug!(
        "Workers produced {} blobs, {} fetch failures",
        stats.blobs(),
        stats.fetch_failures()
    );

    outcome
}
