//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: The step the traversal driver is currently in
//! - `RetryState`: Consecutive failure count for the URL that last failed

mod crawl_state;
mod retry_state;

// Re-export main types
pub use crawl_state::CrawlState;
pub use retry_state::RetryState;
