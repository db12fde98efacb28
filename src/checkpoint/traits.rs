//! Checkpoint store trait and error types

use crate::checkpoint::CheckpointRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing or reading a checkpoint
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Checkpoint not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid checkpoint id: {0}")]
    InvalidId(String),

    #[error("No free checkpoint name for {0}")]
    NameExhausted(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for checkpoint operations
pub type CheckpointResult<T> = Result<T, CheckpointError>;

/// Durable, append-only record of the chapters fetched in a session
///
/// The driver only ever appends; records are never rewritten or removed.
pub trait CheckpointStore {
    /// Appends one record
    ///
    /// The record must be durable when this returns: a crash right after
    /// `append` must not lose it.
    fn append(&mut self, record: &CheckpointRecord) -> CheckpointResult<()>;

    /// Reads back every record in append order
    fn rebuild(&self) -> CheckpointResult<Vec<CheckpointRecord>>;
}
