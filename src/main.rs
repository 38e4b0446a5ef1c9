//! Excavator main entry point
//!
//! This is the command-line interface for the Excavator dictionary crawler.

use anyhow::Context;
use clap::Parser;
use excavator::config::{load_config_with_hash, Config};
use excavator::{Excavator, Step};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Excavator: a cache-backed character dictionary crawler
///
/// Excavator discovers radical → character links on a dictionary site,
/// fetches every character's detail page and stores the extracted records.
/// Fetched pages are cached on disk, so a rerun only downloads what it has
/// not seen before.
#[derive(Parser, Debug)]
#[command(name = "excavator")]
#[command(version)]
#[command(about = "A cache-backed character dictionary crawler", long_about = None)]
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

    /// Part of the crawl to run: all, radical or character
    #[arg(long, default_value = "all")]
    step: Step,

    /// Validate config and show where the run would start without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show record counts from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, cli.step);
        Ok(())
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_run(config, cli.step).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("excavator=info,warn"),
            1 => EnvFilter::new("excavator=debug,info"),
            2 => EnvFilter::new("excavator=trace,debug"),
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

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config, step: Step) {
    let excavator = Excavator::new(config.clone());

    println!("=== Excavator Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.excavator.base_url);
    println!("  Radical type: {}", config.excavator.radical_type.as_str());

    println!("\nWorkspace:");
    println!("  Cache: {}", excavator.cache_dir().display());
    println!("  Database: {}", config.output.database_path);

    println!("\nPipeline:");
    println!("  Step: {}", step);
    println!("  Batch size: {}", config.excavator.batch_size);
    println!("  Channel capacity: {}", config.excavator.channel_capacity);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);

    println!("\n✓ Configuration is valid");
    match step {
        Step::Character => println!(
            "✓ Would read stored radical links from {}",
            config.output.database_path
        ),
        Step::All | Step::Radical => {
            println!("✓ Would start from {}", excavator.index_url());
            println!("✓ Would post radical queries to {}", excavator.query_url());
        }
    }
}

/// Handles the --stats mode: shows record counts from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use excavator::output::{load_statistics, print_statistics};
    use excavator::storage::SqliteStorage;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))
        .with_context(|| format!("failed to open {}", config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the crawl itself
async fn handle_run(config: Config, step: Step) -> anyhow::Result<()> {
    use excavator::output::print_run_summary;

    let mut excavator = Excavator::new(config);

    let cancel = excavator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, finishing items in flight");
            cancel.cancel();
        }
    });

    let summary = excavator
        .run(step)
        .await
        .with_context(|| format!("{} step failed", step))?;

    print_run_summary(&summary);

    if summary.cancelled() {
        tracing::warn!("Run was cancelled before finishing");
    } else if !summary.is_clean() {
        tracing::warn!(
            "Run finished with {} dropped items; rerun to retry them",
            summary.total_failed()
        );
    } else {
        tracing::info!("Run completed successfully");
    }

    Ok(())
}
