//! Checkpoint module for resumable sessions
//!
//! Every chapter the driver extracts is appended here before the crawl
//! advances. On restart the log is replayed to rebuild the chapters already
//! fetched, so nothing is downloaded twice.
//!
//! - `ContentUnit`: one chapter's title, text and source URL
//! - `CheckpointRecord`: a unit plus the successor URL its page declared
//! - `CheckpointLog`: one append-only file per session

mod file_log;
mod format;
mod traits;

pub use file_log::{list_checkpoints, rebuild_path, CheckpointLog};
pub use format::{decode_record, encode_record, split_records, RECORD_DELIMITER};
pub use traits::{CheckpointError, CheckpointResult, CheckpointStore};

use serde::{Deserialize, Serialize};

/// Separator placed between the paragraphs of a chapter body
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// One extracted chapter
///
/// Immutable once built: the fields are only readable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentUnit {
    title: String,
    #[serde(alias = "data")]
    body: String,
    #[serde(default)]
    source_url: String,
}

impl ContentUnit {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            source_url: source_url.into(),
        }
    }

    /// Builds a unit whose body is `paragraphs` joined by [`PARAGRAPH_SEPARATOR`]
    pub fn from_paragraphs<I, S>(
        title: impl Into<String>,
        paragraphs: I,
        source_url: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let body = paragraphs
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR);
        Self::new(title, body, source_url)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Non-empty paragraphs of the body, in order
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.body
            .split(PARAGRAPH_SEPARATOR)
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// The stored form of one chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    #[serde(flatten)]
    pub unit: ContentUnit,

    /// Successor URL declared by the chapter's page, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_url: Option<String>,
}

impl CheckpointRecord {
    pub fn new(unit: ContentUnit, next_url: Option<String>) -> Self {
        Self { unit, next_url }
    }
}

/// Splits rebuilt records into the chapter sequence and the resume cursor
///
/// The cursor is the successor declared by the last record.
pub fn into_units(records: Vec<CheckpointRecord>) -> (Vec<ContentUnit>, Option<String>) {
    let cursor = records.last().and_then(|r| r.next_url.clone());
    let units = records.into_iter().map(|r| r.unit).collect();
    (units, cursor)
}
