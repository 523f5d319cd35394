//! Aniharvest main entry point
//!
//! Command-line interface for the aniharvest catalog pipeline.

use anyhow::Context;
use aniharvest::catalog::{enumerate_catalog, load_targets, save_targets};
use aniharvest::config::{load_config, Config};
use aniharvest::crawler::{build_http_client, fetch_all_reviews, RecoveryController};
use aniharvest::extract::run_extraction;
use aniharvest::progress::{Progress, TracingProgress};
use aniharvest::{Layout, Target};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Aniharvest: a crawl-and-recover pipeline for a ranked anime catalog
///
/// Aniharvest enumerates a paginated ranking list, saves every detail page
/// as a raw HTML document, retries failures until the collection converges,
/// and derives structured TSV records from the saved documents. Each phase
/// skips work that is already on disk.
#[derive(Parser, Debug)]
#[command(name = "aniharvest")]
#[command(version = "1.0.0")]
#[command(about = "A crawl-and-recover pipeline for a ranked anime catalog", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Enumerate the catalog and write the target list, then exit
    #[arg(long, conflicts_with_all = ["fetch", "extract", "reviews"])]
    enumerate: bool,

    /// Fetch raw documents for the saved target list, then exit
    #[arg(long, conflicts_with_all = ["enumerate", "extract", "reviews"])]
    fetch: bool,

    /// Derive structured records from saved documents, then exit
    #[arg(long, conflicts_with_all = ["enumerate", "fetch", "reviews"])]
    extract: bool,

    /// Fetch review snippets for the saved target list, then exit
    #[arg(long, conflicts_with_all = ["enumerate", "fetch", "extract"])]
    reviews: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully");

    // Handle different modes
    if cli.enumerate {
        handle_enumerate(&config).await?;
    } else if cli.fetch {
        handle_fetch(&config).await?;
    } else if cli.extract {
        handle_extract(&config).await?;
    } else if cli.reviews {
        handle_reviews(&config).await?;
    } else {
        handle_run(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("aniharvest=info,warn"),
            1 => EnvFilter::new("aniharvest=debug,info"),
            2 => EnvFilter::new("aniharvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn layout_for(config: &Config) -> Layout {
    Layout::new(
        &config.storage.root,
        &config.storage.reviews_root,
        config.catalog.page_count,
    )
}

fn progress_sink() -> Arc<dyn Progress> {
    Arc::new(TracingProgress::default())
}

/// Loads the saved target list, or enumerates the catalog if there is none
async fn load_or_enumerate(config: &Config) -> anyhow::Result<Vec<Target>> {
    let list_path = Path::new(&config.storage.list_path);
    if list_path.is_file() {
        tracing::info!("Target list {} already exists, loading", list_path.display());
        let targets = load_targets(list_path)?;
        tracing::info!("Loaded {} targets", targets.len());
        return Ok(targets);
    }

    let client = build_http_client(&config.http)?;
    let targets = enumerate_catalog(&client, &config.catalog, progress_sink().as_ref()).await?;
    save_targets(list_path, &targets)?;
    tracing::info!("Saved {} targets to {}", targets.len(), list_path.display());
    Ok(targets)
}

/// Handles the --enumerate mode: always re-enumerates and rewrites the list
async fn handle_enumerate(config: &Config) -> anyhow::Result<()> {
    let client = build_http_client(&config.http)?;
    let targets = enumerate_catalog(&client, &config.catalog, progress_sink().as_ref()).await?;

    let list_path = Path::new(&config.storage.list_path);
    save_targets(list_path, &targets)?;

    println!(
        "Enumerated {} targets into {}",
        targets.len(),
        list_path.display()
    );
    Ok(())
}

/// Handles the --fetch mode: recovers missing raw documents
async fn handle_fetch(config: &Config) -> anyhow::Result<()> {
    let targets = load_targets(Path::new(&config.storage.list_path))
        .context("no saved target list; run with --enumerate first")?;

    let layout = layout_for(config);
    layout.prepare()?;

    let client = build_http_client(&config.http)?;
    let controller = RecoveryController::new(client, layout, config.fetch.clone());
    let leftover = controller.run(&targets, progress_sink()).await;

    report_leftover(&leftover);
    Ok(())
}

/// Handles the --extract mode: derives records from saved documents
async fn handle_extract(config: &Config) -> anyhow::Result<()> {
    let targets = load_targets(Path::new(&config.storage.list_path))
        .context("no saved target list; run with --enumerate first")?;

    let layout = layout_for(config);
    let summary = run_extraction(&layout, Arc::new(targets), progress_sink()).await?;

    println!(
        "Extraction complete: {} written, {} skipped, {} failed",
        summary.written, summary.skipped, summary.failed
    );
    Ok(())
}

/// Handles the --reviews mode: fetches review snippets for every target
async fn handle_reviews(config: &Config) -> anyhow::Result<()> {
    let targets = load_targets(Path::new(&config.storage.list_path))
        .context("no saved target list; run with --enumerate first")?;

    let layout = layout_for(config);
    let client = build_http_client(&config.http)?;
    let failed = fetch_all_reviews(&client, &layout, &config.reviews, &targets, progress_sink())
        .await?;

    if failed > 0 {
        println!("Review sweep complete with {} targets still failing", failed);
    } else {
        println!("Review sweep complete");
    }
    Ok(())
}

/// Handles the default mode: the full pipeline, phase by phase
async fn handle_run(config: &Config) -> anyhow::Result<()> {
    let targets = load_or_enumerate(config).await?;

    let layout = layout_for(config);
    layout.prepare()?;

    let client = build_http_client(&config.http)?;
    let controller = RecoveryController::new(client.clone(), layout.clone(), config.fetch.clone());
    let leftover = controller.run(&targets, progress_sink()).await;
    report_leftover(&leftover);

    let summary = run_extraction(&layout, Arc::new(targets.clone()), progress_sink()).await?;
    tracing::info!(
        "Extraction: {} written, {} skipped, {} failed",
        summary.written,
        summary.skipped,
        summary.failed
    );

    let review_failures =
        fetch_all_reviews(&client, &layout, &config.reviews, &targets, progress_sink()).await?;
    if review_failures > 0 {
        tracing::warn!("{} targets still have no review snippets", review_failures);
    }

    println!(
        "Pipeline complete: {} targets, {} documents unrecovered, {} records written",
        targets.len(),
        leftover.len(),
        summary.written
    );
    Ok(())
}

/// Logs whatever the retry loop could not recover
fn report_leftover(leftover: &[aniharvest::FetchFailure]) {
    if leftover.is_empty() {
        tracing::info!("All documents recovered");
        return;
    }

    tracing::warn!("{} documents could not be recovered", leftover.len());
    for failure in leftover {
        tracing::warn!(
            "  unrecovered: seq {} (partition {}) {}",
            failure.seq,
            failure.partition,
            failure.address
        );
    }
}
