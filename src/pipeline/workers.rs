// src/pipeline/workers.rs

//! Scrape worker pool.
//!
//! Each worker loops: fetch the page, normalize and segment the row text,
//! send the blob, sleep. A failed fetch is counted and skipped. Workers stop
//! when cancelled or when the receiving side is gone.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::services::{PageSource, TextSegmenter};
use crate::utils::normalize_whitespace;

/// Counters shared by all workers.
#[derive(Debug, Default)]
pub struct PoolStats {
    blobs: AtomicU64,
    fetch_failures: AtomicU64,
}

impl PoolStats {
    /// Blobs handed to the channel so far.
    pub fn blobs(&self) -> u64 {
        self.blobs.load(Ordering::Relaxed)
    }

    /// Fetch or parse failures swallowed so far.
    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub(crate) fn record_blob(&self) {
        self.blobs.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }
}

/// Worker pool settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub workers: usize,
    pub interval: Duration,
    pub channel_capacity: usize,
}

/// A running set of scrape workers feeding one channel.
pub struct ScrapeWorkerPool {
    handles: Vec<JoinHandle<()>>,
    cancel: watch::Sender<bool>,
    stats: Arc<PoolStats>,
}

impl ScrapeWorkerPool {
    /// Spawn the workers and return the pool with the receiving end of
    /// their channel.
    pub fn start(
        source: Arc<dyn PageSource>,
        segmenter: Arc<TextSegmenter>,
        settings: &PoolSettings,
    ) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(settings.channel_capacity.max(1));
        let (cancel, cancel_rx) = watch::channel(false);
        let stats = Arc::new(PoolStats::default());

        let handles = (0..settings.workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    source: Arc::clone(&source),
                    segmenter: Arc::clone(&segmenter),
                    tx: tx.clone(),
                    cancel: cancel_rx.clone(),
                    stats: Arc::clone(&stats),
                    interval: settings.interval,
                };
                tokio::spawn(worker.run())
            })
            .collect::<Vec<_>>();

        log::info!("Started scrape workers: {}", handles.len());

        (
            Self {
                handles,
                cancel,
                stats,
            },
            rx,
        )
    }

    pub fn stats(&self) -> Arc<PoolStats> {
        Arc::clone(&self.stats)
    }

    /// Ask every worker to stop and wait up to `grace` for them to exit.
    ///
    /// Workers that are mid-fetch when the grace period runs out are left
    /// to finish on their own; their results go nowhere.
    pub async fn shutdown(self, grace: Duration) {
        let _ = self.cancel.send(true);

        let workers = self.handles.len();
        match tokio::time::timeout(grace, join_all(self.handles)).await {
            Ok(_) => log::debug!("All {} scrape workers stopped", workers),
            Err(_) => log::debug!(
                "Scrape workers still busy after {:?}, detaching",
                grace
            ),
        }
    }
}

struct Worker {
    id: usize,
    source: Arc<dyn PageSource>,
    segmenter: Arc<TextSegmenter>,
    tx: mpsc::Sender<String>,
    cancel: watch::Receiver<bool>,
    stats: Arc<PoolStats>,
    interval: Duration,
}

impl Worker {
    async fn run(mut self) {
        loop {
            if *self.cancel.borrow() {
                break;
            }

            match self.source.fetch_rows().await {
                Ok(rows) => {
                    let blob = self.segmenter.segment(&normalize_whitespace(&rows));
                    tokio::select! {
                        sent = self.tx.send(blob) => {
                            if sent.is_err() {
                                break;
                            }
                            self.stats.record_blob();
                        }
                        _ = self.cancel.changed() => break,
                    }
                }
                Err(e) => {
                    self.stats.record_failure();
                    log::debug!("Worker {} fetch failed: {}", self.id, e);
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.cancel.changed() => break,
            }
        }
        log::debug!("Worker {} stopped", self.id);
    }
}
