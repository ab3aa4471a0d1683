//! Plethora main entry point
//!
//! This is the command-line interface for the Plethora search-and-extract
//! pipeline. The run result is written to stdout as JSON; logs go to stderr.

use clap::Parser;
use plethora::config::{load_config, validate, Config};
use plethora::crawler::{self, RunRequest};
use plethora::DetailLevel;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Plethora: search the web and extract what the results say
///
/// Plethora runs a web search, then politely fetches the result pages (and,
/// at high detail, a few same-site sub-pages of each), respecting robots.txt
/// and per-site rate limits, and prints the structured content as JSON.
#[derive(Parser, Debug)]
#[command(name = "plethora")]
#[command(version)]
#[command(about = "Search, fetch and extract web pages", long_about = None)]
struct Cli {
    /// Search query
    #[arg(value_name = "QUERY")]
    query: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Detail level: low, medium or high
    #[arg(short, long)]
    level: Option<DetailLevel>,

    /// Number of search results to process
    #[arg(short = 'n', long)]
    results: Option<usize>,

    /// Maximum sub-pages per result page (high detail)
    #[arg(short, long)]
    subpages: Option<usize>,

    /// Concurrent fetch workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Bypass the fetch cache for this run
    #[arg(long)]
    no_cache: bool,

    /// Maximum age of usable cache entries, in seconds
    #[arg(long, value_name = "SECS")]
    cache_ttl: Option<u64>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the resolved run without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path).map_err(|e| {
                tracing::error!("Failed to load configuration: {}", e);
                e
            })?
        }
        None => {
            let config = Config::default();
            validate(&config)?;
            config
        }
    };

    if cli.no_cache {
        config.cache.enabled = false;
    }

    let request = build_request(&cli, &config);
    request.validate()?;

    if cli.dry_run {
        handle_dry_run(&config, &request);
        return Ok(());
    }

    match crawler::run(&config, request).await {
        Ok(result) => {
            if cli.verbose > 0 {
                eprintln!("{}", result.stats());
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}

/// Applies command-line overrides on top of the configured defaults
fn build_request(cli: &Cli, config: &Config) -> RunRequest {
    let mut request = RunRequest::from_config(cli.query.clone(), config);
    if let Some(level) = cli.level {
        request.level = level;
    }
    if let Some(results) = cli.results {
        request.desired_count = results;
    }
    if let Some(subpages) = cli.subpages {
        request.max_subpages = subpages;
    }
    if let Some(workers) = cli.workers {
        request.workers = workers;
    }
    if let Some(ttl) = cli.cache_ttl {
        request.cache_ttl = Duration::from_secs(ttl);
    }
    request
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("plethora=info,warn"),
            1 => EnvFilter::new("plethora=debug,info"),
            2 => EnvFilter::new("plethora=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the resolved run settings
fn handle_dry_run(config: &Config, request: &RunRequest) {
    println!("=== Plethora Dry Run ===\n");

    println!("Run:");
    println!("  Query: {}", request.query);
    println!("  Level: {}", request.level);
    println!("  Results: {}", request.desired_count);
    println!("  Sub-pages per result: {}", request.max_subpages);
    println!("  Workers: {}", request.workers);

    println!("\nSearch:");
    println!("  Endpoint: {}", config.search.endpoint);
    println!("  Max pages: {}", config.search.max_pages);

    println!("\nPoliteness:");
    println!("  Respect robots.txt: {}", config.politeness.respect_robots);
    println!("  Robots agent: {}", config.politeness.robots_agent);
    println!(
        "  Minimum domain interval: {}ms",
        config.politeness.min_domain_interval_ms
    );

    println!("\nCache:");
    if request.use_cache {
        println!("  Backend: {:?}", config.cache.backend);
        println!("  Path: {}", config.cache.path);
        println!("  TTL: {}s", request.cache_ttl.as_secs());
    } else {
        println!("  Disabled");
    }

    println!("\n✓ Configuration is valid");
}
