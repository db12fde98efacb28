/// Crawl state definitions for the traversal state machine
///
/// This module defines every state the driver can be in and which
/// transitions between them are legal.
use std::fmt;

/// Represents the current step of the chapter traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    // ===== Active States =====
    /// Driver constructed, nothing fetched yet
    Idle,

    /// Waiting on the page loader for the current URL
    Fetching,

    /// Turning page content into a chapter and a successor URL
    Extracting,

    /// Appending the chapter to the checkpoint log
    Persisting,

    /// Waiting out the fixed inter-request delay
    RateLimiting,

    /// A step failed; backing off or waiting on the operator
    Retrying,

    // ===== Terminal States =====
    /// The last page declared no successor
    Done,

    /// Traversal stopped early (no content, or operator gave up)
    Aborted,
}

impl CrawlState {
    /// Returns true if no further steps follow this state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// Returns true if moving from `self` to `next` is a legal step
    ///
    /// ```text
    /// Idle -> Fetching | Done
    /// Fetching -> Extracting | Retrying | Aborted
    /// Extracting -> Persisting | Retrying
    /// Persisting -> RateLimiting
    /// RateLimiting -> Fetching | Done
    /// Retrying -> Fetching | Aborted
    /// ```
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        use CrawlState::*;
        matches!(
            (self, next),
            (Idle, Fetching)
                | (Idle, Done)
                | (Fetching, Extracting)
                | (Fetching, Retrying)
                | (Fetching, Aborted)
                | (Extracting, Persisting)
                | (Extracting, Retrying)
                | (Persisting, RateLimiting)
                | (RateLimiting, Fetching)
                | (RateLimiting, Done)
                | (Retrying, Fetching)
                | (Retrying, Aborted)
        )
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Persisting => "persisting",
            Self::RateLimiting => "rate_limiting",
            Self::Retrying => "retrying",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
