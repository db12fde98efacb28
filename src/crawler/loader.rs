//! Page loading
//!
//! This module handles the HTTP side of the crawl:
//! - Building the HTTP client with a proper user agent string
//! - Resolving chapter paths against the site's base URL
//! - Classifying responses into content, definitive absence, or a
//!   retryable failure

use crate::config::{CrawlerConfig, UserAgentConfig};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A failed attempt to load a page; always worth retrying
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Cannot resolve {url}: {message}")]
    InvalidUrl { url: String, message: String },
}

/// Turns a URL into page content
#[async_trait]
pub trait PageLoader {
    /// Loads the page at `url`
    ///
    /// * `Ok(Some(content))` - the page content
    /// * `Ok(None)` - the page definitively does not exist; retrying is pointless
    /// * `Err(FetchError)` - a transient failure
    async fn load_page(&self, url: &str) -> Result<Option<String>, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use serial_scribe::config::UserAgentConfig;
/// use serial_scribe::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "SerialScribe".to_string(),
///     crawler_version: "0.1".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Loads chapter pages over HTTP
#[derive(Debug, Clone)]
pub struct HttpPageLoader {
    client: Client,
    base_url: Url,
}

impl HttpPageLoader {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Builds a loader from the crawler and user agent configuration
    pub fn from_config(
        crawler: &CrawlerConfig,
        user_agent: &UserAgentConfig,
        base_url: &str,
    ) -> crate::Result<Self> {
        let client = build_http_client(user_agent, crawler.request_timeout())?;
        Ok(Self::new(client, Url::parse(base_url)?))
    }

    /// Resolves a possibly relative chapter path against the base URL
    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        self.base_url.join(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl PageLoader for HttpPageLoader {
    /// # Response Handling
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | `Ok(Some(body))` |
    /// | 404, 410 | `Ok(None)` |
    /// | other status | `Err(Status)` |
    /// | timeout | `Err(Timeout)` |
    /// | connection / body error | `Err(Http)` |
    async fn load_page(&self, url: &str) -> Result<Option<String>, FetchError> {
        let target = self.resolve(url)?;
        tracing::info!("Loading page for {}", target);

        let response = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(|e| classify_error(target.as_str(), e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            tracing::warn!("{} returned {}, no content", target, status.as_u16());
            return Ok(None);
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                url: target.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(target.as_str(), e))?;
        Ok(Some(body))
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
