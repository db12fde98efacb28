//! Session setup
//!
//! A session is one run of the driver, either starting fresh from a chapter
//! URL or resuming from an existing checkpoint. Everything the run needs
//! (log, already-fetched chapters, starting cursor) is built here once and
//! handed to the driver explicitly.

mod operator;

pub use operator::{InquireOperator, Operator};

use crate::checkpoint::{into_units, CheckpointLog, CheckpointStore, ContentUnit};
use crate::{Result, ScribeError};
use std::path::Path;

/// How the checkpoint log is obtained
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Create a new checkpoint log
    New,

    /// Reopen the named checkpoint log and replay it
    Resume { checkpoint_id: String },
}

/// Parameters of one run, collected from the CLI or the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSession {
    /// Name of the work; titles the book and names new checkpoints
    pub subject: String,

    pub mode: SessionMode,

    /// Where to start fetching; a resume falls back to the stored cursor
    pub start_url: Option<String>,
}

/// A session ready to be driven
#[derive(Debug)]
pub struct PreparedSession {
    pub log: CheckpointLog,

    /// Chapters replayed from the checkpoint, in fetch order
    pub units: Vec<ContentUnit>,

    /// First URL to fetch; `None` when there is nothing left to fetch
    pub start_url: Option<String>,
}

impl CrawlSession {
    pub fn new_download(subject: impl Into<String>, start_url: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            mode: SessionMode::New,
            start_url: Some(start_url.into()),
        }
    }

    pub fn resume(
        subject: impl Into<String>,
        checkpoint_id: impl Into<String>,
        start_url: Option<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            mode: SessionMode::Resume {
                checkpoint_id: checkpoint_id.into(),
            },
            start_url,
        }
    }

    /// Creates or reopens the checkpoint log and works out the cursor
    ///
    /// For a resume, an explicit `start_url` wins; otherwise the crawl
    /// continues at the successor declared by the last stored chapter.
    pub fn prepare(&self, checkpoint_dir: &Path) -> Result<PreparedSession> {
        let start_url = self
            .start_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);

        match &self.mode {
            SessionMode::New => {
                let start_url = start_url.ok_or_else(|| {
                    ScribeError::Session("a new download needs a start URL".to_string())
                })?;
                let log = CheckpointLog::create(checkpoint_dir, &self.subject)?;
                Ok(PreparedSession {
                    log,
                    units: Vec::new(),
                    start_url: Some(start_url),
                })
            }
            SessionMode::Resume { checkpoint_id } => {
                let log = CheckpointLog::open(checkpoint_dir, checkpoint_id)?;
                let (units, cursor) = into_units(log.rebuild()?);
                tracing::info!(
                    "Rebuilt {} chapters from checkpoint {}",
                    units.len(),
                    checkpoint_id
                );

                Ok(PreparedSession {
                    log,
                    units,
                    start_url: start_url.or(cursor),
                })
            }
        }
    }
}
