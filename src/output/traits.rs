//! Book assembler trait and error types

use crate::checkpoint::ContentUnit;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while binding a book
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Nothing to assemble: no chapters")]
    Empty,

    #[error("Invalid book title: {0}")]
    InvalidTitle(String),

    #[error("EPUB generation failed: {0}")]
    Epub(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Binds an ordered chapter sequence into a single book file
pub trait BookAssembler {
    /// Writes the book and returns the path of the file produced
    fn assemble(&self, units: &[ContentUnit], title: &str) -> OutputResult<PathBuf>;
}
