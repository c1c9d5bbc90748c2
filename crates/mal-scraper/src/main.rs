//! MAL Scraper CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use mal_scraper::{scrape, PaginationDriver, ResultSink, RunStatus, SinkOutcome, TokioSleeper};
use shared::config::ConfigOrigin;
use shared::{Config, SourceKind};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Source to walk: api (Jikan) or markup (ranking page)
    #[arg(short, long)]
    source: Option<SourceKind>,

    /// Stop after this many pages
    #[arg(long)]
    max_pages: Option<u32>,

    /// CSV export path (overrides config)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// SQLite database path (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let (mut config, origin) = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if let Some(source) = args.source {
        config.scraper.source = source;
    }
    if args.max_pages.is_some() {
        config.scraper.max_pages = args.max_pages;
    }

    // Initialize logging
    let mut log_config = shared::LogConfig::from_settings(&config.logging, &config.log_dir(), "mal-scraper");
    if args.verbose {
        log_config.default_level = tracing::Level::DEBUG;
    }
    shared::logging::init(log_config)?;

    info!("MAL Scraper starting");
    match origin {
        ConfigOrigin::File(path) => info!(
            config_file = %path.display(),
            source = %config.scraper.source,
            "Loaded configuration"
        ),
        ConfigOrigin::Defaults => warn!(
            config_file = %args.config.display(),
            source = %config.scraper.source,
            "Config file not found, using defaults"
        ),
    }

    config
        .data_paths()
        .create_dirs()
        .context("Failed to create data directory")?;

    let csv_path = args.csv.unwrap_or_else(|| config.csv_path());
    let db_path = args.db.unwrap_or_else(|| config.database_path());
    let sink = ResultSink::new(csv_path, db_path);

    let driver = PaginationDriver::from_config(&config.scraper, Arc::new(TokioSleeper))
        .context("Failed to create page source")?;

    let outcome = scrape(driver, &sink).await.context("Failed to persist results")?;

    info!("=== Scraping Complete ===");
    info!("Pages fetched: {}", outcome.report.pages_fetched);
    info!("Anime collected: {}", outcome.summary.total);
    info!("Items rejected: {}", outcome.report.rejected);
    info!("Duplicates replaced: {}", outcome.report.replaced);

    match &outcome.report.status {
        RunStatus::Complete(reason) => info!("Run complete ({})", reason),
        RunStatus::Partial { page, cause } => {
            warn!("Run stopped early at {} ({}); partial results kept", page, cause)
        }
    }

    match &outcome.sink {
        SinkOutcome::Persisted { csv_path, db_path, .. } => {
            info!("CSV: {}", csv_path.display());
            info!("Database: {}", db_path.display());
        }
        SinkOutcome::NothingToPersist => {
            warn!("No anime data fetched; no output files written");
        }
    }

    info!("MAL Scraper finished");

    Ok(())
}
