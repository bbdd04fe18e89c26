// src/pipeline/ingest.rs

//! Ingest loop.
//!
//! The single consumer of the worker channel. It owns the fingerprint store
//! and the quote log; nothing else writes to either. Three event sources
//! feed it: blobs from the workers, a periodic tick and an interrupt.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{AppError, Result};
use crate::models::{Fingerprint, IngestConfig, Record};
use crate::pipeline::workers::PoolStats;
use crate::services::TextSegmenter;
use crate::storage::{FingerprintStore, QuoteLog};

/// Something the loop reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Blob(String),
    Tick,
    Interrupt,
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The configured run of consecutive duplicates was reached
    DuplicateThreshold,
    /// Operator interrupt
    Interrupted,
    /// Every worker went away
    SourceClosed,
}

/// What to do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Stop(StopReason),
}

/// Counters kept between events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunState {
    /// Accepted blobs since the last periodic reset
    pub accepted: u64,
    /// Consecutive duplicates since the last accepted blob
    pub duplicate_streak: u32,
}

impl RunState {
    fn accept(&mut self) {
        self.accepted += 1;
        self.duplicate_streak = 0;
    }

    fn duplicate(&mut self) -> u32 {
        self.duplicate_streak += 1;
        self.duplicate_streak
    }

    fn tick(&mut self) {
        self.accepted = 0;
    }
}

/// Snapshot logged on every periodic tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodReport {
    pub accepted: u64,
    pub fetch_failures: u64,
    pub known_fingerprints: usize,
}

/// Summary of one ingest run.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub reason: StopReason,
    pub accepted: u64,
    pub duplicates: u64,
    pub records_written: u64,
    pub fetch_failures: u64,
    pub known_fingerprints: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Dedup, segment and persist incoming blobs.
pub struct IngestLoop {
    store: FingerprintStore,
    log: QuoteLog,
    segmenter: Arc<TextSegmenter>,
    stats: Arc<PoolStats>,
    duplicates_to_stop: u32,
    report_period: Duration,
    state: RunState,
    last_report: Option<PeriodReport>,
    accepted_total: u64,
    duplicates_total: u64,
    records_total: u64,
}

impl IngestLoop {
    /// Fails when the report period or the duplicate threshold is zero.
    pub fn new(
        store: FingerprintStore,
        log: QuoteLog,
        segmenter: Arc<TextSegmenter>,
        stats: Arc<PoolStats>,
        config: &IngestConfig,
    ) -> Result<Self> {
        if config.report_period_secs == 0 {
            return Err(AppError::validation(
                "ingest.report_period_secs must be > 0",
            ));
        }
        if config.duplicates_to_stop == 0 {
            return Err(AppError::validation(
                "ingest.duplicates_to_stop must be > 0",
            ));
        }

        Ok(Self {
            store,
            log,
            segmenter,
            stats,
            duplicates_to_stop: config.duplicates_to_stop,
            report_period: config.report_period(),
            state: RunState::default(),
            last_report: None,
            accepted_total: 0,
            duplicates_total: 0,
            records_total: 0,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn store(&self) -> &FingerprintStore {
        &self.store
    }

    /// The report produced by the most recent tick.
    pub fn last_report(&self) -> Option<PeriodReport> {
        self.last_report
    }

    /// Apply one event.
    pub async fn handle(&mut self, event: Event) -> Result<Control> {
        match event {
            Event::Blob(blob) => self.ingest(&blob).await,
            Event::Tick => {
                let report = PeriodReport {
                    accepted: self.state.accepted,
                    fetch_failures: self.stats.fetch_failures(),
                    known_fingerprints: self.store.len(),
                };
                log::debug!(
                    "Tick: {} accepted this period, {} fetch failures, {} known fingerprints",
                    report.accepted,
                    report.fetch_failures,
                    report.known_fingerprints
                );
                self.last_report = Some(report);
                self.state.tick();
                Ok(Control::Continue)
            }
            Event::Interrupt => Ok(Control::Stop(StopReason::Interrupted)),
        }
    }

    async fn ingest(&mut self, blob: &str) -> Result<Control> {
        let fp = Fingerprint::of(blob);

        if self.store.contains(&fp) {
            self.duplicates_total += 1;
            let streak = self.state.duplicate();
            log::debug!("Duplicate {} (streak {})", fp, streak);
            if streak == self.duplicates_to_stop {
                return Ok(Control::Stop(StopReason::DuplicateThreshold));
            }
            return Ok(Control::Continue);
        }

        self.store.record(fp).await?;
        self.state.accept();
        self.accepted_total += 1;

        let tokens = self.segmenter.split(blob);
        log::debug!("Accepted {}: {:?}", fp, tokens);
        let records = Record::from_tokens(&tokens);
        let written = self.log.append(&records).await?;
        self.records_total += written as u64;

        Ok(Control::Continue)
    }

    /// Drive the loop until a stop condition.
    ///
    /// `interrupt` resolves once when the operator asks to stop. The store
    /// and log are closed when this returns, on every path.
    pub async fn run<F>(
        mut self,
        blobs: &mut mpsc::Receiver<String>,
        interrupt: F,
    ) -> Result<IngestOutcome>
    where
        F: Future<Output = ()>,
    {
        let started_at = Utc::now();
        let mut ticker =
            tokio::time::interval_at(Instant::now() + self.report_period, self.report_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(interrupt);

        let reason = loop {
            let event = tokio::select! {
                blob = blobs.recv() => match blob {
                    Some(blob) => Event::Blob(blob),
                    None => break StopReason::SourceClosed,
                },
                _ = ticker.tick() => Event::Tick,
                _ = &mut interrupt => Event::Interrupt,
            };

            if let Control::Stop(reason) = self.handle(event).await? {
                break reason;
            }
        };

        log::debug!(
            "Closing {} and {}",
            self.store.path().display(),
            self.log.path().display()
        );

        Ok(IngestOutcome {
            reason,
            accepted: self.accepted_total,
            duplicates: self.duplicates_total,
            records_written: self.records_total,
            fetch_failures: self.stats.fetch_failures(),
            known_fingerprints: self.store.len(),
            started_at,
            finished_at: Utc::now(),
        })
    }
}
