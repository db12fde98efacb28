//! Serial-Scribe: a resumable chapter crawler
//!
//! This crate walks a chain of chapter pages, each declaring its successor,
//! and collects their text into an ordered sequence that is bound into a
//! single book. Every extracted chapter is appended to a checkpoint log
//! before the crawl advances, so an interrupted session can be resumed
//! without fetching anything twice.

pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod output;
pub mod session;
pub mod state;

use thiserror::Error;

/// Main error type for Serial-Scribe operations
#[derive(Debug, Error)]
pub enum ScribeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] checkpoint::CheckpointError),

    #[error("Extraction error: {0}")]
    Extract(#[from] crawler::ExtractError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlState,
        to: state::CrawlState,
    },

    #[error("Operator prompt failed: {0}")]
    Prompt(String),

    #[error("Session error: {0}")]
    Session(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector in config: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Serial-Scribe operations
pub type Result<T> = std::result::Result<T, ScribeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use checkpoint::{CheckpointLog, CheckpointRecord, CheckpointStore, ContentUnit};
pub use config::Config;
pub use crawler::{CrawlOutcome, CrawlReport, Driver, RetryController, RetryDecision};
pub use session::{CrawlSession, SessionMode};
pub use state::CrawlState;
