//! Bucket-Sync main entry point
//!
//! This is the command-line interface for the Bucket-Sync dump tool.

use anyhow::Context;
use bucket_sync::bucket::build_query;
use bucket_sync::config::{load_config_with_hash, validate, Config};
use bucket_sync::output::{load_dump_statistics, print_dump_statistics, print_report};
use bucket_sync::recipe::RecipeSource;
use bucket_sync::sync::{run_sync, BucketSource};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Bucket-Sync: a resumable dump tool for wiki Bucket data
///
/// Pages through the wiki's recipe bucket, drops duplicate recipes, and
/// merges the result into a local JSON dump. Interrupted runs pick up
/// from the last checkpoint.
#[derive(Parser, Debug)]
#[command(name = "bucket-sync")]
#[command(version)]
#[command(about = "A resumable dump tool for wiki Bucket data", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Dump file to read and write (overrides the config)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Wiki api.php endpoint (overrides the config)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Discard the existing dump and start from the beginning
    #[arg(long)]
    force_refresh: bool,

    /// Show the effective configuration and first query without fetching
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics for the existing dump and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_sync(&config, cli.force_refresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bucket_sync=info,warn"),
            1 => EnvFilter::new("bucket_sync=debug,info"),
            2 => EnvFilter::new("bucket_sync=trace,debug"),
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

/// Loads the config file (or defaults) and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(output) = &cli.output {
        config.output.dump_path = output.clone();
    }
    if let Some(base_url) = &cli.base_url {
        config.api.base_url = base_url.clone();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows what a sync would do
fn handle_dry_run(config: &Config) {
    let source = RecipeSource;
    let first_query = source.base_query().page(config.fetch.page_size, 0);

    println!("=== Bucket-Sync Dry Run ===\n");

    println!("Endpoint:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  User agent: {}", config.api.user_agent);
    println!("  Request timeout: {}s", config.api.request_timeout_secs);

    println!("\nFetch:");
    println!("  Source: {}", source.name());
    println!("  Page size: {}", config.fetch.page_size);
    println!("  Stop after empty chunks: {}", config.fetch.max_empty_chunks);
    println!("  Checkpoint every: {} chunks", config.fetch.checkpoint_interval);
    println!("  Courtesy delay: {}ms", config.fetch.courtesy_delay_ms);
    println!("  Retry backoff: {}ms", config.fetch.retry_backoff_ms);

    println!("\nOutput:");
    println!("  Dump: {}", config.output.dump_path.display());

    println!("\nFirst query:");
    println!("  {}", build_query(&first_query));

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows what the existing dump contains
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let path = &config.output.dump_path;
    let stats = load_dump_statistics(path)
        .with_context(|| format!("No readable dump at {}", path.display()))?;
    print_dump_statistics(&stats, path);
    Ok(())
}

/// Handles the main sync operation
async fn handle_sync(config: &Config, force_refresh: bool) -> anyhow::Result<()> {
    if force_refresh {
        tracing::info!("Force refresh mode enabled - will start from the beginning");
    } else {
        tracing::info!("Recipes are always fully re-scanned and merged into the existing dump");
    }

    match run_sync(config, force_refresh).await {
        Ok(report) => {
            print_report(&report, &config.output.dump_path);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Sync failed: {}", e);
            Err(e).context("Fatal error during sync")
        }
    }
}
