//! Rumble-Crawl main entry point
//!
//! This is the command-line interface for the Rumble-Crawl storefront crawler.

use anyhow::{bail, Context};
use clap::Parser;
use rumble_crawl::config::{load_config_with_hash, Config};
use rumble_crawl::crawler::Crawler;
use rumble_crawl::mirror::LocalMirror;
use rumble_crawl::output::{load_statistics, print_products, print_report, print_statistics};
use rumble_crawl::product::ProductVisitor;
use rumble_crawl::storage::{ProductStore, RunStatus, RunTotals, SqliteStore};
use rumble_crawl::url::Origin;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Rumble-Crawl: a storefront product crawler
///
/// Rumble-Crawl walks a single site depth-first at a fixed request rate,
/// records every product page it finds and mirrors the product images.
#[derive(Parser, Debug)]
#[command(name = "rumble-crawl")]
#[command(version)]
#[command(about = "A storefront product crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Crawl the site rooted at this URL
    #[arg(long, value_name = "URL", conflicts_with_all = ["list", "stats"])]
    crawl: Option<String>,

    /// List stored products with their mirrored images and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    list: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list"])]
    stats: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

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

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, cli.crawl.as_deref())?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.list {
        handle_list(&config)?;
    } else if let Some(seed) = cli.crawl.as_deref() {
        handle_crawl(&config, &config_hash, seed).await?;
    } else {
        bail!("Nothing to do: pass --crawl <URL>, --list, --stats or --dry-run");
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rumble_crawl=info,warn"),
            1 => EnvFilter::new("rumble_crawl=debug,info"),
            2 => EnvFilter::new("rumble_crawl=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config, seed: Option<&str>) -> anyhow::Result<()> {
    println!("=== Rumble-Crawl Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Minimum request interval: {}ms",
        config.crawler.min_request_interval
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Max depth: {}", describe_limit(config.crawler.max_depth));
    println!("  Max pages: {}", describe_limit(config.crawler.max_pages));

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nImage Mirror:");
    println!("  Directory: {}", config.mirror.directory);
    println!("  Public base URL: {}", config.mirror.public_base_url);

    println!("\n✓ Configuration is valid");
    if let Some(seed) = seed {
        let origin = Origin::parse(seed).with_context(|| format!("Invalid seed URL {}", seed))?;
        println!("✓ Would crawl {} (origin {})", seed, origin);
    }

    Ok(())
}

fn describe_limit(limit: Option<u32>) -> String {
    limit.map_or_else(|| "unbounded".to_string(), |n| n.to_string())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --list mode: prints every product and its mirrored images
fn handle_list(config: &Config) -> anyhow::Result<()> {
    let store = SqliteStore::new(Path::new(&config.output.database_path))?;
    let mirror = LocalMirror::from_config(&config.mirror)?;

    let listings = store.list_products()?;
    print_products(&listings, &mirror);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str, seed: &str) -> anyhow::Result<()> {
    let origin = Origin::parse(seed).with_context(|| format!("Invalid seed URL {}", seed))?;
    let seed = Url::parse(seed)?;

    let mut store = SqliteStore::new(Path::new(&config.output.database_path))
        .context("Failed to open product database")?;
    let mirror = LocalMirror::from_config(&config.mirror)?;
    mirror
        .ensure_directory()
        .await
        .with_context(|| format!("Cannot create mirror directory {}", config.mirror.directory))?;

    let cancel = CancellationToken::new();
    let crawler = Crawler::from_config(config, origin)?.with_cancellation(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing current page");
            cancel.cancel();
        }
    });

    let run_id = store.create_run(seed.as_str(), config_hash)?;
    tracing::info!("Starting run #{} from {}", run_id, seed);

    let mut visitor = ProductVisitor::new(store, mirror, crawler.fetcher());
    let report = crawler.crawl(seed, &mut visitor).await;
    let visits = visitor.stats();

    let status = RunStatus::for_outcome(report.cancelled, visits.store_errors);
    if status == RunStatus::Failed {
        tracing::error!("{} product writes failed", visits.store_errors);
    }
    visitor.store_mut().complete_run(
        run_id,
        status,
        RunTotals {
            pages_visited: report.pages_visited() as u64,
            products_found: visits.products_added,
        },
    )?;

    print_report(&report, &visits);

    Ok(())
}
