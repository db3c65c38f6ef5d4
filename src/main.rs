//! Product-Trawler main entry point
//!
//! This is the command-line interface for the Product-Trawler crawler.

use anyhow::Context;
use clap::Parser;
use product_trawler::config::{load_config_with_hash, Config};
use product_trawler::crawler::Orchestrator;
use product_trawler::output::JsonFileSink;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Product-Trawler: discovers product pages on e-commerce sites
///
/// Product-Trawler follows in-domain links from each configured domain up to
/// a bounded depth and writes the product URLs it finds as a JSON array.
#[derive(Parser, Debug)]
#[command(name = "product-trawler")]
#[command(version)]
#[command(about = "Discovers product page URLs on e-commerce sites", long_about = None)]
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

    /// Validate config and show what would be crawled without crawling
    #[arg(long)]
    dry_run: bool,

    /// Write results here instead of the configured results path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let results_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.results_path));

    if cli.dry_run {
        print_dry_run(&config, &results_path);
        return Ok(());
    }

    handle_crawl(config, results_path).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("product_trawler=info,warn"),
            1 => EnvFilter::new("product_trawler=debug,info"),
            2 => EnvFilter::new("product_trawler=trace,debug"),
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

/// Prints the resolved configuration for --dry-run
fn print_dry_run(config: &Config, results_path: &std::path::Path) {
    let crawler = &config.crawler;

    println!("=== Product-Trawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", crawler.max_depth);
    println!("  Domain parallelism: {}", crawler.domain_parallelism);
    println!("  Page concurrency: {}", crawler.page_concurrency);
    match crawler.max_pages_per_domain {
        Some(cap) => println!("  Max pages per domain: {}", cap),
        None => println!("  Max pages per domain: unlimited"),
    }
    println!("  Inter-request delay: {}ms", crawler.inter_request_delay_ms);
    println!("  Request timeout: {}ms", crawler.request_timeout_ms);
    println!(
        "  Rate limit: {} attempts, {}ms cooldown",
        crawler.retry_limit, crawler.rate_limit_cooldown_ms
    );

    println!("\nClassifier:");
    println!("  Host matching: {:?}", config.classifier.host_match);
    for pattern in &config.classifier.product_patterns {
        println!("  - path contains {}", pattern);
    }
    for expr in &config.classifier.product_regexes {
        println!("  - path matches /{}/", expr);
    }

    println!("\nUser Agent: {}", config.user_agent.value);
    println!("Results: {}", results_path.display());

    println!("\nDomains ({}):", config.domains.len());
    for domain in &config.domains {
        println!("  - {}", domain);
    }

    println!("\n✓ Configuration is valid");
}

/// Runs the crawl and writes the results file
///
/// Ctrl-C stops the crawl early; whatever was found is still written.
async fn handle_crawl(config: Config, results_path: PathBuf) -> anyhow::Result<()> {
    tracing::info!(
        "Crawling {} domains, max depth {}, {} at a time",
        config.domains.len(),
        config.crawler.max_depth,
        config.crawler.domain_parallelism
    );

    let orchestrator = Orchestrator::new(config).context("failed to set up the crawl")?;

    let cancel = orchestrator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight pages");
            cancel.cancel();
        }
    });

    let sink = JsonFileSink::new(&results_path);
    let results = orchestrator
        .run_into(&sink)
        .await
        .with_context(|| format!("failed to write {}", results_path.display()))?;

    let total: usize = results.iter().map(|r| r.product_urls.len()).sum();
    tracing::info!(
        "Crawl completed: {} product URLs across {} domains",
        total,
        results.len()
    );

    Ok(())
}
