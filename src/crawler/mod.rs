//! Crawler module for chapter fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Page loading over HTTP
//! - Chapter extraction from HTML
//! - Retry policy and fixed request pacing
//! - The sequential traversal driver

mod driver;
mod extractor;
mod loader;
mod rate_limit;
mod retry;

pub use driver::{CrawlOutcome, CrawlReport, Driver};
pub use extractor::{collect_text, ContentExtractor, ExtractError, Extracted, HtmlExtractor};
pub use loader::{build_http_client, FetchError, HttpPageLoader, PageLoader};
pub use rate_limit::RateLimiter;
pub use retry::{RetryController, RetryDecision, DEFAULT_MAX_AUTO_RETRIES};

use crate::config::Config;
use crate::session::{CrawlSession, Operator};
use crate::Result;
use std::path::Path;
use tracing::Instrument;

/// Runs a complete crawl session
///
/// This is the main entry point for a download. It will:
/// 1. Create or reopen the session's checkpoint log
/// 2. Replay already-saved chapters
/// 3. Build the HTTP loader and the HTML extractor
/// 4. Drive the traversal to its end
///
/// The returned report carries every chapter, replayed and new, ready to be
/// bound into a book.
pub async fn run_session<O: Operator>(
    config: &Config,
    session: &CrawlSession,
    operator: O,
) -> Result<CrawlReport> {
    let prepared = session.prepare(Path::new(&config.output.checkpoint_dir))?;
    let checkpoint_id = prepared.log.id().to_string();
    tracing::info!("Session checkpoint: {}", checkpoint_id);

    let loader = HttpPageLoader::from_config(
        &config.crawler,
        &config.user_agent,
        &config.site.base_url,
    )?;
    let extractor = HtmlExtractor::new(&config.site)?;

    let span = tracing::info_span!(
        "session",
        subject = %session.subject,
        checkpoint = %checkpoint_id
    );

    let mut driver = Driver::new(loader, extractor, prepared.log, operator, &config.crawler);
    driver
        .run(prepared.start_url, prepared.units)
        .instrument(span)
        .await
}
