//! Onionwatch main entry point
//!
//! Command-line interface for the hidden-service keyword monitor.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

use onionwatch::config::{load_config_with_hash, Config};
use onionwatch::crawler::{build_http_client, Fetcher, Orchestrator, Pacer};
use onionwatch::discovery::SeedDiscoverer;
use onionwatch::probe::{Probe, Prober};
use onionwatch::storage::{MemoryStorage, SqliteStorage, Storage};
use onionwatch::tor::TorController;
use tracing_subscriber::EnvFilter;

/// Onionwatch: a hidden-service keyword monitor
///
/// Validates and re-crawls v3 onion addresses through a local SOCKS
/// proxy, scanning fetched pages for configured keywords and persisting
/// seed health and hits in SQLite.
#[derive(Parser, Debug)]
#[command(name = "onionwatch")]
#[command(version = "1.0.0")]
#[command(about = "A hidden-service keyword monitor", long_about = None)]
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

    /// Run the seed discovery pass before scanning
    #[arg(long)]
    populate: bool,

    /// Use an in-memory seed store (one-shot scan, nothing persisted)
    #[arg(long)]
    ephemeral: bool,

    /// Request a new circuit before the run starts
    #[arg(long)]
    rotate_identity: bool,

    /// Validate config and show what would be scanned without scanning
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }
    if cli.stats {
        return handle_stats(&config);
    }

    handle_monitor(config, config_hash, &cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("onionwatch=info,warn"),
            1 => EnvFilter::new("onionwatch=debug,info"),
            2 => EnvFilter::new("onionwatch=trace,debug"),
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

/// Handles the --dry-run mode: validates config, shows what would run
fn handle_dry_run(config: &Config) {
    println!("=== Onionwatch Dry Run ===\n");

    println!("Network:");
    println!("  SOCKS proxy: {}", config.network.socks_proxy);
    println!("  Control addr: {}", config.network.control_addr);

    println!("\nMonitor:");
    println!("  Probe timeout: {}s", config.monitor.probe_timeout_secs);
    println!("  Fetch timeout: {}s", config.monitor.fetch_timeout_secs);
    println!(
        "  Politeness delay: {}ms",
        config.monitor.politeness_delay_ms
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Quarantine: {}", config.output.quarantine_dir);

    println!("\nKeywords ({}):", config.keywords.len());
    for keyword in &config.keywords {
        println!("  - {}", keyword);
    }

    println!("\nSeed sources ({}):", config.seeding.sources.len());
    for source in &config.seeding.sources {
        println!("  - {}", source);
    }
    println!("Manual seeds ({}):", config.seeding.seeds.len());
    for seed in &config.seeding.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    println!("Database: {}\n", config.output.database_path);
    println!("Active seeds: {}", storage.count_active_seeds()?);
    println!("Recorded matches: {}", storage.count_matches()?);

    let recent = storage.recent_matches(10)?;
    if !recent.is_empty() {
        println!("\nMost recent matches:");
        for m in recent {
            println!("  [{}] {} -> {}", m.timestamp, m.url, m.keyword);
        }
    }

    Ok(())
}

/// Handles the main monitor operation
async fn handle_monitor(
    config: Config,
    config_hash: String,
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    let controller = TorController::new(&config.network.control_addr);

    if !controller.is_running().await {
        tracing::warn!(
            "Control channel not reachable; continuing, but the proxy may be down"
        );
    }

    if cli.rotate_identity || config.monitor.rotate_identity_between_runs {
        if let Err(e) = controller.rotate_identity().await {
            tracing::warn!("Identity rotation failed: {}", e);
        }
    }

    let client = build_http_client(&config.network)?;
    let prober = Prober::new(
        client.clone(),
        Duration::from_secs(config.monitor.probe_timeout_secs),
    );
    let fetch_timeout = Duration::from_secs(config.monitor.fetch_timeout_secs);
    let fetcher = Fetcher::new(
        client.clone(),
        fetch_timeout,
        Path::new(&config.output.quarantine_dir),
    );
    let pacer = Pacer::new(Duration::from_millis(config.monitor.politeness_delay_ms));

    // Discovery runs through the same proxied client; candidates are
    // probed before they enter the seed store, so only reachable
    // addresses are admitted.
    let discovered = if cli.populate && !config.seeding.sources.is_empty() {
        let discoverer = SeedDiscoverer::new(client, fetch_timeout);
        let candidates: Vec<String> = discoverer
            .discover_seeds(&config.seeding.sources)
            .await
            .into_iter()
            .collect();
        prober.filter_batch(&candidates).await
    } else {
        Vec::new()
    };

    if cli.ephemeral {
        tracing::info!("Ephemeral mode: results will not be persisted");
        let store = MemoryStorage::new();
        let orchestrator = Orchestrator::new(store, prober, fetcher, pacer, config.keywords.clone());
        run_monitor(orchestrator, &config, &config_hash, &discovered).await
    } else {
        let store = SqliteStorage::new(Path::new(&config.output.database_path))?;
        let orchestrator = Orchestrator::new(store, prober, fetcher, pacer, config.keywords.clone());
        run_monitor(orchestrator, &config, &config_hash, &discovered).await
    }
}

async fn run_monitor<S: Storage>(
    mut orchestrator: Orchestrator<S, Prober>,
    config: &Config,
    config_hash: &str,
    discovered: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let manual = orchestrator.admit_seeds(config.seeding.seeds.iter().map(|s| s.as_str()))?;
    let found = orchestrator.admit_seeds(discovered.iter().map(|s| s.as_str()))?;
    if manual + found > 0 {
        tracing::info!("Admitted {} new seeds ({} discovered)", manual + found, found);
    }

    match orchestrator.run(config_hash).await {
        Ok(summary) => {
            tracing::info!("Monitor run finished");
            println!(
                "Scanned {} seeds: {} succeeded, {} failed, {} matched, {} evicted",
                summary.scanned,
                summary.succeeded,
                summary.failed,
                summary.matched,
                summary.evicted
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Monitor run failed: {}", e);
            Err(e.into())
        }
    }
}
