//! Operator interaction
//!
//! The operator is asked twice at most: once for the session parameters
//! when the CLI did not provide them, and whenever a chapter keeps failing
//! past the automatic retry threshold.

use crate::checkpoint::list_checkpoints;
use crate::session::{CrawlSession, SessionMode};
use crate::{Result, ScribeError};
use async_trait::async_trait;
use inquire::{Confirm, InquireError, Select, Text};
use std::path::{Path, PathBuf};

/// Decisions that need a human
#[async_trait]
pub trait Operator: Send + Sync {
    /// Collects the parameters of a new or resumed session
    async fn session_params(&self) -> Result<CrawlSession>;

    /// Asks whether to keep trying `url` after `attempts` failures in a row
    ///
    /// `true` resumes at the failing URL, `false` ends the crawl.
    async fn confirm_retry(&self, url: &str, attempts: u32) -> Result<bool>;
}

/// Terminal prompts
///
/// `inquire` blocks on stdin, so every prompt runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct InquireOperator {
    checkpoint_dir: PathBuf,
}

const NEW_DOWNLOAD: &str = "New download";
const RESUME_DOWNLOAD: &str = "Resume from checkpoint";

impl InquireOperator {
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
        }
    }
}

#[async_trait]
impl Operator for InquireOperator {
    async fn session_params(&self) -> Result<CrawlSession> {
        let dir = self.checkpoint_dir.clone();
        tokio::task::spawn_blocking(move || prompt_session(&dir))
            .await
            .map_err(|e| ScribeError::Prompt(e.to_string()))?
    }

    async fn confirm_retry(&self, url: &str, attempts: u32) -> Result<bool> {
        let message = format!("{} failed {} times in a row. Keep trying?", url, attempts);
        let answer = tokio::task::spawn_blocking(move || {
            Confirm::new(&message).with_default(true).prompt()
        })
        .await
        .map_err(|e| ScribeError::Prompt(e.to_string()))?;

        match answer {
            Ok(retry) => Ok(retry),
            // Esc / Ctrl-C at this prompt means stop
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(false),
            Err(e) => Err(prompt_error(e)),
        }
    }
}

fn prompt_session(checkpoint_dir: &Path) -> Result<CrawlSession> {
    let mode = Select::new(
        "Start a new download or resume one?",
        vec![NEW_DOWNLOAD, RESUME_DOWNLOAD],
    )
    .prompt()
    .map_err(prompt_error)?;

    let subject = Text::new("Book title").prompt().map_err(prompt_error)?;

    if mode == NEW_DOWNLOAD {
        let start_url = Text::new("First chapter URL")
            .prompt()
            .map_err(prompt_error)?;
        return Ok(CrawlSession::new_download(subject, start_url));
    }

    let checkpoints = list_checkpoints(checkpoint_dir)?;
    let checkpoint_id = if checkpoints.is_empty() {
        Text::new("Checkpoint id").prompt().map_err(prompt_error)?
    } else {
        Select::new("Checkpoint", checkpoints)
            .prompt()
            .map_err(prompt_error)?
    };

    let start_url = Text::new("Resume from URL (empty: continue after the last saved chapter)")
        .with_default("")
        .prompt()
        .map_err(prompt_error)?;

    Ok(CrawlSession {
        subject,
        mode: SessionMode::Resume { checkpoint_id },
        start_url: Some(start_url).filter(|u| !u.trim().is_empty()),
    })
}

fn prompt_error(error: InquireError) -> ScribeError {
    ScribeError::Prompt(error.to_string())
}
