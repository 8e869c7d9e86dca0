//! Dorkscan main entry point
//!
//! This is the command-line interface for the Dorkscan search-and-crawl engine.

use anyhow::{bail, Context};
use clap::Parser;
use dorkscan::config::{load_config_with_hash, load_dork_file, validate, Config};
use dorkscan::crawler::{build_search_url, search_query, Engine};
use dorkscan::output::{format_report, handlers_for, print_statistics, write_outputs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Dorkscan: batched, dork-driven search and crawl
///
/// Dorkscan appends each dork to the base query, collects the search
/// engine's organic results, and crawls the hits in small concurrent batches
/// to extract headings, contact details and social links.
#[derive(Parser, Debug)]
#[command(name = "dorkscan")]
#[command(version)]
#[command(about = "Batched, dork-driven search-and-crawl engine", long_about = None)]
struct Cli {
    /// Base search query
    #[arg(value_name = "QUERY")]
    query: String,

    /// Search qualifier appended to the query (repeatable)
    #[arg(short, long = "dork", value_name = "DORK")]
    dorks: Vec<String>,

    /// File with one dork per line (`#` starts a comment)
    #[arg(long, value_name = "FILE")]
    dorks_file: Option<PathBuf>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Result pages to fetch per dork (1-20)
    #[arg(long)]
    max_pages: Option<u32>,

    /// Write the markdown report to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Write the full run result as JSON to this file
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,

    /// Validate config and show the planned searches without running them
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

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(path) = &cli.report {
        config.output.report_path = Some(path.display().to_string());
    }
    if let Some(path) = &cli.json {
        config.output.json_path = Some(path.display().to_string());
    }
    validate(&config).context("invalid configuration")?;

    let mut dorks = cli.dorks.clone();
    if let Some(path) = &cli.dorks_file {
        let from_file = load_dork_file(path)
            .with_context(|| format!("failed to read dorks from {}", path.display()))?;
        tracing::info!("Loaded {} dork(s) from {}", from_file.len(), path.display());
        dorks.extend(from_file);
    }
    if dorks.is_empty() {
        bail!("no dorks given; use --dork or --dorks-file");
    }

    if cli.dry_run {
        return handle_dry_run(&config, &cli.query, &dorks, cli.max_pages);
    }

    handle_run(config, &cli.query, &dorks, cli.max_pages).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dorkscan=info,warn"),
            1 => EnvFilter::new("dorkscan=debug,info"),
            2 => EnvFilter::new("dorkscan=trace,debug"),
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

/// Handles --dry-run: prints the resolved configuration and planned searches
fn handle_dry_run(
    config: &Config,
    query: &str,
    dorks: &[String],
    max_pages: Option<u32>,
) -> anyhow::Result<()> {
    let pages = max_pages.unwrap_or(config.engine.max_pages);

    println!("=== Dorkscan Dry Run ===\n");

    println!("Engine:");
    println!("  Browser backend: {:?}", config.browser.backend);
    println!("  Concurrency: {}", config.engine.concurrency);
    println!("  Max retries: {}", config.engine.max_retries);
    println!(
        "  Batches: {} URLs each, at most {} per dork",
        config.engine.batch_size, config.engine.max_batches_per_dork
    );
    println!(
        "  Delays: {}ms per request, {}ms between batches, {}ms between dorks",
        config.engine.per_request_delay_ms,
        config.engine.inter_batch_delay_ms,
        config.engine.inter_dork_delay_ms
    );
    println!(
        "  User agents: {} (rotation {})",
        config.user_agent.pool.len(),
        if config.user_agent.rotation { "on" } else { "off" }
    );

    println!("\nExcluded crawl domains ({}):", config.crawl.excluded_domains.len());
    for pattern in &config.crawl.excluded_domains {
        println!("  - {}", pattern);
    }

    println!("\nPlanned searches ({} dork(s) x {} page(s)):", dorks.len(), pages);
    for dork in dorks {
        let search = search_query(query, dork);
        println!("  - {}", search);
        for page in 0..pages {
            let offset = page.saturating_mul(config.search.results_per_page);
            let url = build_search_url(&config.search, &search, offset)
                .context("invalid search base URL")?;
            println!("    * {}", url);
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main run
async fn handle_run(
    config: Config,
    query: &str,
    dorks: &[String],
    max_pages: Option<u32>,
) -> anyhow::Result<()> {
    let handlers = handlers_for(&config.output);
    let report_to_stdout = config.output.report_path.is_none();
    let output = config.output.clone();

    let engine = Engine::new(config)?;
    let run = match engine.run(query, dorks, max_pages).await {
        Ok(run) => run,
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            return Err(e.into());
        }
    };

    println!("{}\n", run.summary);
    print_statistics(&run.stats);

    if report_to_stdout {
        println!("\n{}", format_report(&run, &output));
    }

    let failures = write_outputs(&handlers, &run);
    if failures > 0 {
        bail!("{} output(s) could not be written", failures);
    }

    Ok(())
}
