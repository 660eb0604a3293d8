//! Boletin-Scraper main entry point
//!
//! This is the command-line interface for building and updating the legal
//! bulletin dataset.

use anyhow::Context;
use boletin_scraper::config::{load_config_with_hash, validate, Config};
use boletin_scraper::crawler;
use boletin_scraper::output::{load_statistics, print_statistics};
use boletin_scraper::storage::RunSummary;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Boletin-Scraper: incremental legal bulletin dataset builder
///
/// Scrapes the national legislation portal day by day and appends every
/// document to a JSON lines dataset, resuming from the last stored date.
#[derive(Parser, Debug)]
#[command(name = "boletin-scraper")]
#[command(version)]
#[command(about = "Incremental legal bulletin dataset builder", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Append every date after the last stored one, through today
    Update {
        /// Dataset file to extend
        #[arg(long, env = "BOLETIN_DATASET")]
        dataset: Option<PathBuf>,
    },

    /// Rebuild the dataset from a start date, overwriting it
    Create {
        /// Dataset file to overwrite
        #[arg(long, env = "BOLETIN_DATASET")]
        dataset: Option<PathBuf>,

        /// First date to scrape (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },

    /// Scrape one date and print its records as JSON lines
    Scrape {
        /// Publication date (YYYY-MM-DD)
        date: NaiveDate,
    },

    /// Show statistics for the dataset and exit
    Stats {
        /// Dataset file to inspect
        #[arg(long, env = "BOLETIN_DATASET")]
        dataset: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(cli.config.as_deref())?;

    match cli.command {
        Command::Update { dataset } => {
            apply_dataset_override(&mut config, dataset)?;
            handle_update(&config).await?;
        }
        Command::Create {
            dataset,
            start_date,
        } => {
            apply_dataset_override(&mut config, dataset)?;
            if let Some(start_date) = start_date {
                config.dataset.start_date = start_date;
            }
            handle_create(&config).await?;
        }
        Command::Scrape { date } => handle_scrape(&config, date).await?,
        Command::Stats { dataset } => {
            apply_dataset_override(&mut config, dataset)?;
            handle_stats(&config)?;
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("boletin_scraper=info,warn"),
            1 => EnvFilter::new("boletin_scraper=debug,info"),
            2 => EnvFilter::new("boletin_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file when given, otherwise the built-in defaults
fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

fn apply_dataset_override(config: &mut Config, dataset: Option<PathBuf>) -> anyhow::Result<()> {
    if let Some(dataset) = dataset {
        config.dataset.path = dataset.display().to_string();
        validate(config)?;
    }
    Ok(())
}

fn log_summary(summary: &RunSummary) {
    tracing::info!(
        "{} dates scraped ({} without data), {} records written",
        summary.dates_processed,
        summary.dates_without_data,
        summary.records_written
    );
}

/// Handles the `update` command
async fn handle_update(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Updating dataset {}", config.dataset.path);

    let summary = crawler::update(config)
        .await
        .with_context(|| format!("Update of {} failed", config.dataset.path))?;
    log_summary(&summary);
    Ok(())
}

/// Handles the `create` command
async fn handle_create(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Creating dataset {} from {}",
        config.dataset.path,
        config.dataset.start_date
    );

    let summary = crawler::create(config)
        .await
        .with_context(|| format!("Creation of {} failed", config.dataset.path))?;
    log_summary(&summary);
    Ok(())
}

/// Handles the `scrape` command: records go to stdout, logs to stderr
async fn handle_scrape(config: &Config, date: NaiveDate) -> anyhow::Result<()> {
    let records = crawler::scrape_date(config, date).await?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for record in &records {
        writeln!(out, "{}", serde_json::to_string(record)?)?;
    }
    out.flush()?;

    tracing::info!("{} records for {}", records.len(), date);
    Ok(())
}

/// Handles the `stats` command
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Dataset: {}\n", config.dataset.path);

    let stats = load_statistics(Path::new(&config.dataset.path))?;
    print_statistics(&stats);

    Ok(())
}
