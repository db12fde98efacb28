//! Crawl driver - the chapter traversal loop
//!
//! The driver walks the chapter chain one page at a time:
//! 1. Loads the current URL
//! 2. Extracts the chapter and its successor
//! 3. Appends the chapter to the checkpoint log
//! 4. Waits the fixed inter-request delay
//! 5. Advances to the successor, or stops when there is none
//!
//! Failed loads and extractions go through the retry controller. Nothing is
//! ever fetched in parallel: chapter N+1 is requested only after chapter N
//! has been persisted.

use crate::checkpoint::{CheckpointRecord, CheckpointStore, ContentUnit};
use crate::config::CrawlerConfig;
use crate::crawler::extractor::ContentExtractor;
use crate::crawler::loader::PageLoader;
use crate::crawler::rate_limit::RateLimiter;
use crate::crawler::retry::{RetryController, RetryDecision};
use crate::session::Operator;
use crate::state::CrawlState;
use crate::{Result, ScribeError};

/// How a traversal ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// The last page declared no successor
    Completed,

    /// The loader reported that `url` has no content
    Exhausted { url: String },

    /// The operator gave up on `url` after repeated failures
    OperatorAbort { url: String },
}

/// Everything a traversal produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Replayed chapters followed by the newly fetched ones, in fetch order
    pub units: Vec<ContentUnit>,

    pub outcome: CrawlOutcome,

    /// Chapters fetched during this run (excludes replayed ones)
    pub fetched: usize,
}

impl CrawlReport {
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, CrawlOutcome::Completed)
    }
}

/// Sequential chapter crawler
pub struct Driver<L, E, C, O> {
    loader: L,
    extractor: E,
    store: C,
    operator: O,
    retry: RetryController,
    limiter: RateLimiter,
    state: CrawlState,
}

impl<L, E, C, O> Driver<L, E, C, O>
where
    L: PageLoader,
    E: ContentExtractor,
    C: CheckpointStore,
    O: Operator,
{
    /// Creates a driver using the pacing and retry settings of `config`
    pub fn new(loader: L, extractor: E, store: C, operator: O, config: &CrawlerConfig) -> Self {
        Self::with_policy(
            loader,
            extractor,
            store,
            operator,
            RetryController::new(config.retry_base_delay(), config.max_auto_retries),
            RateLimiter::new(config.request_delay()),
        )
    }

    pub fn with_policy(
        loader: L,
        extractor: E,
        store: C,
        operator: O,
        retry: RetryController,
        limiter: RateLimiter,
    ) -> Self {
        Self {
            loader,
            extractor,
            store,
            operator,
            retry,
            limiter,
            state: CrawlState::Idle,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn store(&self) -> &C {
        &self.store
    }

    /// Walks the chain from `start_url` until it ends
    ///
    /// `initial_units` (chapters replayed from a checkpoint) form the exact
    /// prefix of the returned sequence. A checkpoint write failure is the
    /// only error; every other way the crawl can end returns the chapters
    /// gathered so far.
    pub async fn run(
        &mut self,
        start_url: Option<String>,
        initial_units: Vec<ContentUnit>,
    ) -> Result<CrawlReport> {
        let mut units = initial_units;
        let mut fetched = 0;

        let Some(mut url) = start_url.filter(|u| !u.trim().is_empty()) else {
            self.transition(CrawlState::Done)?;
            tracing::info!("Nothing to fetch, {} chapters already saved", units.len());
            return Ok(CrawlReport {
                units,
                outcome: CrawlOutcome::Completed,
                fetched,
            });
        };

        tracing::info!(
            "Starting crawl at {} with {} chapters already saved",
            url,
            units.len()
        );

        loop {
            self.transition(CrawlState::Fetching)?;
            let content = match self.loader.load_page(&url).await {
                Ok(Some(content)) => content,
                Ok(None) => {
                    self.transition(CrawlState::Aborted)?;
                    tracing::warn!(
                        "No content for {}, stopping with {} chapters",
                        url,
                        units.len()
                    );
                    return Ok(CrawlReport {
                        units,
                        outcome: CrawlOutcome::Exhausted { url },
                        fetched,
                    });
                }
                Err(e) => {
                    tracing::error!("Download failed for chapter {}: {}", url, e);
                    if self.recover(&url).await? {
                        continue;
                    }
                    return Ok(CrawlReport {
                        units,
                        outcome: CrawlOutcome::OperatorAbort { url },
                        fetched,
                    });
                }
            };

            self.transition(CrawlState::Extracting)?;
            let extracted = match self.extractor.extract(&content, &url) {
                Ok(extracted) => extracted,
                Err(e) => {
                    tracing::error!("Extraction failed for chapter {}: {}", url, e);
                    if self.recover(&url).await? {
                        continue;
                    }
                    return Ok(CrawlReport {
                        units,
                        outcome: CrawlOutcome::OperatorAbort { url },
                        fetched,
                    });
                }
            };

            // Persist before advancing: a crash from here on loses at most
            // the advance, never the chapter
            self.transition(CrawlState::Persisting)?;
            let record = CheckpointRecord::new(extracted.unit, extracted.next_url);
            self.store.append(&record)?;

            let CheckpointRecord { unit, next_url } = record;
            tracing::info!("[{}] Saved chapter '{}'", units.len() + 1, unit.title());
            units.push(unit);
            fetched += 1;

            self.transition(CrawlState::RateLimiting)?;
            self.limiter.wait().await;

            match next_url.filter(|u| !u.trim().is_empty()) {
                Some(next) => url = next,
                None => {
                    self.transition(CrawlState::Done)?;
                    tracing::info!("All chapters downloaded ({} total)", units.len());
                    return Ok(CrawlReport {
                        units,
                        outcome: CrawlOutcome::Completed,
                        fetched,
                    });
                }
            }
        }
    }

    /// Handles a failed step for `url`
    ///
    /// Returns `true` when the step should be tried again and `false` when
    /// the crawl is over.
    async fn recover(&mut self, url: &str) -> Result<bool> {
        self.transition(CrawlState::Retrying)?;

        match self.retry.record_failure(url) {
            RetryDecision::Retry { delay, .. } => {
                tokio::time::sleep(delay).await;
                Ok(true)
            }
            RetryDecision::Escalate { attempts } => {
                let keep_going = match self.operator.confirm_retry(url, attempts).await {
                    Ok(answer) => answer,
                    Err(e) => {
                        tracing::error!("Could not ask the operator about {}: {}", url, e);
                        false
                    }
                };

                if keep_going {
                    tracing::info!("Operator chose to keep trying {}", url);
                    self.retry.reset();
                    Ok(true)
                } else {
                    self.transition(CrawlState::Aborted)?;
                    tracing::warn!("Download failed, operator stopped the crawl at {}", url);
                    Ok(false)
                }
            }
        }
    }

    fn transition(&mut self, to: CrawlState) -> Result<()> {
        if !self.state.can_transition_to(to) {
            return Err(ScribeError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        tracing::trace!("{} -> {}", self.state, to);
        if to.is_terminal() {
            tracing::debug!("Traversal finished in state {}", to);
        }
        self.state = to;
        Ok(())
    }
}
