//! quotegrab CLI
//!
//! Scrapes the quotes page until it stops producing new content, appending
//! every new record to the quotes file.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use quotegrab::{
    error::Result,
    models::Config,
    pipeline::{self, StopReason},
    services::HttpPageSource,
    storage::FingerprintStore,
};

/// quotegrab - Quote Page Scraper
#[derive(Parser, Debug)]
#[command(name = "quotegrab", version, about = "Quote page scraper with durable dedup")]

struct Cli {
    /// Path to an optional TOML config file
    #[arg(short, long, default_value = "quotegrab.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Number of scrape workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Seconds between accepted-counter resets
    #[arg(short, long)]
    report_period: Option<u64>,

    /// Consecutive duplicates that end the run
    #[arg(short, long)]
    duplicates_to_stop: Option<u32>,

    /// Fingerprint file
    #[arg(long)]
    hash_file: Option<PathBuf>,

    /// Output file for records
    #[arg(long)]
    quotes_file: Option<PathBuf>,

    /// Page to scrape
    #[arg(long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape until the duplicate threshold or Ctrl-C (default)
    Run,

    /// Validate configuration
    Validate,

    /// Show fingerprint store info
    Info,
}

impl Cli {
    /// Apply command-line overrides on top of the file config.
    fn apply(&self, config: &mut Config) {
        if let Some(workers) = self.workers {
            config.scraper.workers = workers;
        }
        if let Some(period) = self.report_period {
            config.ingest.report_period_secs = period;
        }
        if let Some(dups) = self.duplicates_to_stop {
            config.ingest.duplicates_to_stop = dups;
        }
        if let Some(path) = &self.hash_file {
            config.paths.fingerprint_file = path.clone();
        }
        if let Some(path) = &self.quotes_file {
            config.paths.quotes_file = path.clone();
        }
        if let Some(url) = &self.url {
            config.scraper.source_url = url.clone();
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    cli.apply(&mut config);

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            log::info!("quotegrab starting on {}", config.scraper.source_url);
            let source = Arc::new(HttpPageSource::new(&config.scraper)?);

            let interrupt = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    log::warn!("Cannot listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            };

            let outcome = match pipeline::run_scraper(&config, source, interrupt).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("Fatal: {}", e);
                    return Err(e);
                }
            };

            match outcome.reason {
                StopReason::DuplicateThreshold => log::info!(
                    "Stopped after {} consecutive duplicates",
                    config.ingest.duplicates_to_stop
                ),
                StopReason::Interrupted => log::info!("Interrupted"),
                StopReason::SourceClosed => log::warn!("All scrape workers exited"),
            }
            log::info!(
                "Accepted {} blobs ({} records, {} fetch failures) in {}s",
                outcome.accepted,
                outcome.records_written,
                outcome.fetch_failures,
                (outcome.finished_at - outcome.started_at).num_seconds()
            );
            log::info!("Lines: {}", outcome.known_fingerprints);
        }

        Command::Validate => {
            log::info!("✓ Config OK");
            log::info!("    source: {}", config.scraper.source_url);
            log::info!("    workers: {}", config.scraper.workers);
            log::info!(
                "    stop after {} duplicates",
                config.ingest.duplicates_to_stop
            );
        }

        Command::Info => {
            let path = &config.paths.fingerprint_file;
            let known = FingerprintStore::load(path).await?;
            log::info!("Fingerprint file: {}", path.display());
            log::info!("Known fingerprints: {}", known.len());
            log::info!(
                "Quotes file: {} ({})",
                config.paths.quotes_file.display(),
                if config.paths.quotes_file.exists() {
                    "exists"
                } else {
                    "not found"
                }
            );
        }
    }

    Ok(())
}
