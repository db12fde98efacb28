/// Tracks consecutive failures of a single URL
///
/// Held by the retry controller for the lifetime of the process. A failure
/// on a URL other than `last_failed_url` starts a fresh count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryState {
    /// The URL whose failure was recorded most recently
    pub last_failed_url: Option<String>,

    /// Failures recorded in a row for `last_failed_url`
    pub consecutive_failures: u32,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for `url` and returns the updated count
    pub fn record(&mut self, url: &str) -> u32 {
        if self.last_failed_url.as_deref() != Some(url) {
            self.consecutive_failures = 0;
            self.last_failed_url = Some(url.to_string());
        }
        self.consecutive_failures += 1;
        self.consecutive_failures
    }

    /// Clears the failure count, keeping the last URL for log context
    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
    }
}
