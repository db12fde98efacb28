//! Serial-Scribe main entry point
//!
//! This is the command-line interface for the Serial-Scribe chapter crawler.

use anyhow::Context;
use clap::{ArgGroup, Parser};
use serial_scribe::checkpoint::{into_units, CheckpointLog, CheckpointStore};
use serial_scribe::config::{load_config_with_hash, Config};
use serial_scribe::crawler::{run_session, CrawlOutcome, CrawlReport};
use serial_scribe::output::assemble_book;
use serial_scribe::session::{CrawlSession, InquireOperator, Operator};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Serial-Scribe: a resumable chapter crawler
///
/// Follows a chain of chapter pages, saves every chapter to a checkpoint as
/// it goes, and binds the result into a single book. Run without a mode flag
/// to be asked for the session parameters interactively.
#[derive(Parser, Debug)]
#[command(name = "serial-scribe")]
#[command(version)]
#[command(about = "A resumable chapter crawler", long_about = None)]
#[command(group(ArgGroup::new("checkpoint").args(["resume", "assemble_only"])))]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Start a new download of the named book
    #[arg(long, value_name = "TITLE", conflicts_with = "resume")]
    new: Option<String>,

    /// Resume the download recorded in this checkpoint
    #[arg(long, value_name = "CHECKPOINT_ID", conflicts_with = "new")]
    resume: Option<String>,

    /// Book title when resuming or assembling (defaults to the checkpoint id)
    #[arg(long, value_name = "TITLE", requires = "checkpoint")]
    subject: Option<String>,

    /// URL of the chapter to start from
    #[arg(long, value_name = "URL")]
    start_url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with_all = ["list", "assemble_only"])]
    dry_run: bool,

    /// Show the chapters stored in a checkpoint and exit
    #[arg(long, value_name = "CHECKPOINT_ID", conflicts_with_all = ["dry_run", "assemble_only"])]
    list: Option<String>,

    /// Bind the book from a checkpoint without crawling and exit
    #[arg(long, value_name = "CHECKPOINT_ID", conflicts_with_all = ["dry_run", "list"])]
    assemble_only: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, &cli);
        return Ok(());
    }

    if let Some(id) = &cli.list {
        return handle_list(&config, id);
    }

    if let Some(id) = &cli.assemble_only {
        let title = cli.subject.clone().unwrap_or_else(|| title_from_checkpoint(id));
        return handle_assemble_only(&config, id, &title);
    }

    let operator = InquireOperator::new(&config.output.checkpoint_dir);
    let session = match session_from_cli(&cli) {
        Some(session) => session,
        None => operator
            .session_params()
            .await
            .context("failed to read session parameters")?,
    };

    handle_crawl(&config, &session, operator).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("serial_scribe=info,warn"),
            1 => EnvFilter::new("serial_scribe=debug,info"),
            2 => EnvFilter::new("serial_scribe=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // The default fmt layer prefixes every line with a timestamp
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the session from flags, or `None` when the operator must be asked
fn session_from_cli(cli: &Cli) -> Option<CrawlSession> {
    if let Some(subject) = &cli.new {
        let start_url = cli.start_url.clone().unwrap_or_default();
        return Some(CrawlSession::new_download(subject.clone(), start_url));
    }

    cli.resume.as_ref().map(|id| {
        let subject = cli.subject.clone().unwrap_or_else(|| title_from_checkpoint(id));
        CrawlSession::resume(subject, id.clone(), cli.start_url.clone())
    })
}

/// Strips the timestamp and extension from a checkpoint id
fn title_from_checkpoint(id: &str) -> String {
    let stem = id.strip_suffix(".ckpt").unwrap_or(id);
    let without_stamp = stem
        .rsplit_once('-')
        .filter(|(_, stamp)| {
            stamp.contains('T') && stamp.chars().next().is_some_and(|c| c.is_ascii_digit())
        })
        .map(|(name, _)| name)
        .unwrap_or(stem);
    without_stamp.to_string()
}

/// Handles the --dry-run mode: validates config and shows what would happen
fn handle_dry_run(config: &Config, cli: &Cli) {
    println!("=== Serial-Scribe Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Retry base delay: {}ms", config.crawler.retry_base_delay_ms);
    println!("  Automatic retries: {}", config.crawler.max_auto_retries);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nSite:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Title: {}", config.site.title_selector);
    println!("  Content: {}", config.site.content_selector);
    println!(
        "  Next chapter: {} [{}]",
        config.site.next_selector, config.site.next_attribute
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Checkpoints: {}", config.output.checkpoint_dir);
    println!("  Books: {} ({:?})", config.output.book_dir, config.output.format);

    println!("\n✓ Configuration is valid");
    match session_from_cli(cli) {
        Some(session) => println!(
            "✓ Would run {:?} for '{}' starting at {}",
            session.mode,
            session.subject,
            session.start_url.as_deref().unwrap_or("(stored cursor)")
        ),
        None => println!("✓ Would ask for the session parameters"),
    }
}

/// Handles the --list mode: prints what a checkpoint holds
fn handle_list(config: &Config, id: &str) -> anyhow::Result<()> {
    use serial_scribe::output::{checkpoint_statistics, print_statistics};

    let log = CheckpointLog::open(Path::new(&config.output.checkpoint_dir), id)?;
    let records = log.rebuild()?;
    print_statistics(&checkpoint_statistics(id, &records));
    Ok(())
}

/// Handles the --assemble-only mode: binds a book straight from a checkpoint
fn handle_assemble_only(config: &Config, id: &str, title: &str) -> anyhow::Result<()> {
    let log = CheckpointLog::open(Path::new(&config.output.checkpoint_dir), id)?;
    let (units, _) = into_units(log.rebuild()?);

    let path = assemble_book(&config.output, &units, title)?;
    println!("✓ Book written to: {}", path.display());
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl<O: Operator>(
    config: &Config,
    session: &CrawlSession,
    operator: O,
) -> anyhow::Result<()> {
    tracing::info!("Starting session for '{}' ({:?})", session.subject, session.mode);

    let report = match run_session(config, session, operator).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    log_outcome(&report);

    // Whatever was gathered is still bound, even after an early stop
    if report.units.is_empty() {
        tracing::warn!("No chapters downloaded, skipping book generation");
        return Ok(());
    }

    if !report.is_complete() {
        tracing::warn!("Binding a partial book of {} chapters", report.units.len());
    }

    let path = assemble_book(&config.output, &report.units, &session.subject)?;
    tracing::info!("Book written to {}", path.display());
    Ok(())
}

fn log_outcome(report: &CrawlReport) {
    match &report.outcome {
        CrawlOutcome::Completed => tracing::info!(
            "Crawl completed: {} new chapters, {} total",
            report.fetched,
            report.units.len()
        ),
        CrawlOutcome::Exhausted { url } => tracing::warn!(
            "Crawl stopped at {} (no content): {} new chapters, {} total",
            url,
            report.fetched,
            report.units.len()
        ),
        CrawlOutcome::OperatorAbort { url } => tracing::warn!(
            "Crawl aborted at {}: {} new chapters, {} total",
            url,
            report.fetched,
            report.units.len()
        ),
    }
}
