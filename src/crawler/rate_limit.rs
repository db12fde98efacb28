use std::time::Duration;

/// Fixed pause between two chapter requests
///
/// The delay is the same after every chapter; it does not react to response
/// codes, latency or page size.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    delay: Duration,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits out the delay
    pub async fn wait(&self) {
        if self.delay.is_zero() {
            return;
        }
        tracing::debug!("Waiting {:?} before the next request", self.delay);
        tokio::time::sleep(self.delay).await;
    }
}
