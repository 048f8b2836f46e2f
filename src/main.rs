//! site-survey main entry point
//!
//! This is the command-line interface for the site-survey crawler.

use anyhow::{bail, Context};
use clap::Parser;
use site_survey::config::{read_config, resolve_config, Config, Overrides, TextMode};
use site_survey::crawler::run_survey;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// site-survey: a single-site crawler and link auditor
///
/// site-survey crawls one website breadth-first from a seed URL, dumps page
/// text, counts internal links per destination, and cross-checks the crawl
/// against the site's sitemap.
#[derive(Parser, Debug)]
#[command(name = "site-survey")]
#[command(version)]
#[command(about = "A single-site crawler and link auditor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// URL to start crawling from
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Maximum number of pages visited by link-following
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Directory receiving every output file
    #[arg(short, long, value_name = "DIR")]
    output: Option<String>,

    /// Write one text file per page instead of combined.txt
    #[arg(long)]
    per_page: bool,

    /// Write data.csv and internal_link_data.csv
    #[arg(long)]
    tabular: bool,

    /// Also export the run to this SQLite database
    #[arg(long, value_name = "PATH")]
    database: Option<String>,

    /// Number of pages fetched concurrently
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate the configuration and print it without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the latest run in the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Run to show with --stats instead of the latest one
    #[arg(long, value_name = "ID", requires = "stats")]
    run: Option<i64>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            seed_url: self.seed.clone(),
            max_pages: self.max_pages,
            directory: self.output.clone(),
            per_page: self.per_page,
            tabular: self.tabular,
            database_path: self.database.clone(),
            concurrency: self.concurrency,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if cli.stats {
        return handle_stats(&cli);
    }

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let (config, config_hash) = resolve_config(cli.config.as_deref(), &cli.overrides())
        .context("Invalid configuration")?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, &config_hash);
        return Ok(());
    }

    handle_crawl(&config, &config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_survey=info,warn"),
            1 => EnvFilter::new("site_survey=debug,info"),
            2 => EnvFilter::new("site_survey=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, config_hash: &str) {
    println!("=== site-survey Dry Run ===\n");

    println!("Crawler Configuration:");
    println!(
        "  Seed URL: {}",
        config.crawler.seed_url.as_deref().unwrap_or_default()
    );
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Accepted scheme: {}", config.crawler.accepted_scheme);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );

    println!("\nUser Agent:");
    println!(
        "  {}/{}",
        config.user_agent.crawler_name, config.user_agent.crawler_version
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!(
        "  Text: {}",
        match config.output.text_mode {
            TextMode::Combined => "combined.txt",
            TextMode::PerPage => "one file per page",
        }
    );
    println!(
        "  CSV export: {}",
        if config.output.tabular { "yes" } else { "no" }
    );
    match config.database_file() {
        Some(path) => println!("  Database: {}", path.display()),
        None => println!("  Database: none"),
    }
    println!(
        "  Summary: {}",
        if config.output.summary { "yes" } else { "no" }
    );

    println!("\n✓ Configuration is valid (hash: {})", config_hash);
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(cli: &Cli) -> anyhow::Result<()> {
    use site_survey::output::{load_statistics, print_statistics};
    use site_survey::storage::open_storage;

    let mut config = match &cli.config {
        Some(path) => read_config(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => Config::default(),
    };
    cli.overrides().apply(&mut config);

    let Some(path) = config.database_file() else {
        bail!("--stats needs a database (set output.database-path or pass --database)");
    };
    if !path.exists() {
        bail!("Database {} does not exist", path.display());
    }

    println!("Database: {}\n", path.display());

    let storage = open_storage(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let stats = load_statistics(&storage, cli.run)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, finishing the current pages");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let report = run_survey(config, config_hash, cancel)
        .await
        .context("Survey failed")?;

    if report.cancelled {
        tracing::info!("Survey cancelled after {} pages", report.visited.len());
    } else {
        tracing::info!("Survey completed successfully");
    }
    if !report.failures.is_empty() {
        tracing::warn!("{} URLs could not be fetched", report.failures.len());
    }

    Ok(())
}
