//! Pipeline stages and the entry point that wires them together.
//!
//! - `ScrapeWorkerPool`: concurrent page fetchers feeding one channel
//! - `IngestLoop`: the single consumer that dedupes and persists
//! - `run_scraper`: opens the durable files and runs both until a stop

pub mod ingest;
pub mod run;
pub mod workers;

pub use ingest::{Control, Event, IngestLoop, IngestOutcome, PeriodReport, RunState, StopReason};
pub use run::run_scraper;
pub use workers::{PoolSettings, PoolStats, ScrapeWorkerPool};
