use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Serial-Scribe
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawl pacing and retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Fixed delay applied after every persisted chapter (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// Base of the linear retry backoff (milliseconds)
    #[serde(rename = "retry-base-delay-ms")]
    pub retry_base_delay_ms: u64,

    /// Consecutive failures on one URL tolerated before asking the operator
    #[serde(rename = "max-auto-retries", default = "default_max_auto_retries")]
    pub max_auto_retries: u32,

    /// Per-request timeout enforced by the HTTP client (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_max_auto_retries() -> u32 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

/// Where chapter data lives on the target site
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL that relative chapter paths are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Selector of the element holding the chapter title
    #[serde(rename = "title-selector")]
    pub title_selector: String,

    /// Selector of the element holding the chapter text
    #[serde(rename = "content-selector")]
    pub content_selector: String,

    /// Selector of the element declaring the next chapter
    #[serde(rename = "next-selector")]
    pub next_selector: String,

    /// Attribute of the next element carrying the successor URL
    #[serde(rename = "next-attribute", default = "default_next_attribute")]
    pub next_attribute: String,
}

fn default_next_attribute() -> String {
    "href".to_string()
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the user agent header: `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory holding one checkpoint log per session
    #[serde(rename = "checkpoint-dir")]
    pub checkpoint_dir: String,

    /// Directory the finished book is written to
    #[serde(rename = "book-dir")]
    pub book_dir: String,

    /// Author recorded in the book metadata
    #[serde(default = "default_author")]
    pub author: String,

    /// Book file format
    #[serde(default)]
    pub format: BookFormat,
}

fn default_author() -> String {
    "Unknown".to_string()
}

/// Supported book formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookFormat {
    #[default]
    Epub,
    Html,
    Markdown,
}
