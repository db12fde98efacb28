//! Retry policy for failed traversal steps
//!
//! Failures on the same URL back off linearly (`base_delay × attempt`).
//! Once the attempt count passes the threshold the controller stops retrying
//! on its own and hands the decision to the operator.

use crate::state::RetryState;
use std::time::Duration;

/// Default number of automatic retries before the operator is asked
pub const DEFAULT_MAX_AUTO_RETRIES: u32 = 5;

/// What to do about a failed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay`, then try the same URL again
    Retry { attempt: u32, delay: Duration },

    /// Too many consecutive failures; ask the operator
    Escalate { attempts: u32 },
}

/// Decides the fate of retryable failures
#[derive(Debug, Clone)]
pub struct RetryController {
    base_delay: Duration,
    max_auto_retries: u32,
    state: RetryState,
}

impl RetryController {
    pub fn new(base_delay: Duration, max_auto_retries: u32) -> Self {
        Self {
            base_delay,
            max_auto_retries,
            state: RetryState::new(),
        }
    }

    /// Records a failure of `url` and decides what happens next
    ///
    /// The count restarts whenever `url` differs from the URL that failed
    /// last, so failures of an earlier chapter never count against a later one.
    pub fn record_failure(&mut self, url: &str) -> RetryDecision {
        let attempt = self.state.record(url);

        if attempt > self.max_auto_retries {
            tracing::warn!(
                "{} failed {} times in a row, escalating to operator",
                url,
                attempt
            );
            return RetryDecision::Escalate { attempts: attempt };
        }

        let delay = self.base_delay.saturating_mul(attempt);
        tracing::info!(
            "Retry {}/{} for {} in {:?}",
            attempt,
            self.max_auto_retries,
            url,
            delay
        );
        RetryDecision::Retry { attempt, delay }
    }

    /// Clears the failure count after the operator chose to continue
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Current failure bookkeeping
    pub fn state(&self) -> &RetryState {
        &self.state
    }

    pub fn max_auto_retries(&self) -> u32 {
        self.max_auto_retries
    }
}

impl Default for RetryController {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), DEFAULT_MAX_AUTO_RETRIES)
    }
}
