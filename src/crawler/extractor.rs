//! Chapter extraction from HTML
//!
//! This module turns a chapter page into:
//! - The chapter title
//! - The chapter text, as paragraphs
//! - The URL of the next chapter, if the page declares one

use crate::checkpoint::ContentUnit;
use crate::config::SiteConfig;
use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;
use url::{Position, Url};

/// A page whose structure does not match the configured selectors
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No element matches '{selector}' on {url}")]
    MissingElement { selector: String, url: String },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("Invalid next chapter link '{href}' on {url}: {message}")]
    InvalidNextUrl {
        href: String,
        url: String,
        message: String,
    },
}

/// Result of extracting one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    /// Successor URL; `None` ends the traversal
    pub next_url: Option<String>,

    /// The chapter found on the page
    pub unit: ContentUnit,
}

/// Turns page content into a chapter and its successor
pub trait ContentExtractor {
    fn extract(&self, content: &str, url: &str) -> Result<Extracted, ExtractError>;
}

/// Selector-driven extractor for chapter pages
#[derive(Debug, Clone)]
pub struct HtmlExtractor {
    base: Url,
    title: Selector,
    title_source: String,
    content: Selector,
    content_source: String,
    next: Selector,
    next_attribute: String,
}

impl HtmlExtractor {
    /// Compiles the selectors described by the site configuration
    pub fn new(site: &SiteConfig) -> Result<Self, ExtractError> {
        let base = Url::parse(&site.base_url).map_err(|e| ExtractError::InvalidBaseUrl {
            url: site.base_url.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            base,
            title: compile(&site.title_selector)?,
            title_source: site.title_selector.clone(),
            content: compile(&site.content_selector)?,
            content_source: site.content_selector.clone(),
            next: compile(&site.next_selector)?,
            next_attribute: site.next_attribute.clone(),
        })
    }

    fn extract_title(&self, document: &Html, url: &str) -> Result<String, ExtractError> {
        document
            .select(&self.title)
            .next()
            .and_then(|element| {
                element
                    .text()
                    .map(str::trim)
                    .find(|t| !t.is_empty())
                    .map(str::to_string)
            })
            .ok_or_else(|| ExtractError::MissingElement {
                selector: self.title_source.clone(),
                url: url.to_string(),
            })
    }

    fn extract_paragraphs(&self, document: &Html, url: &str) -> Result<Vec<String>, ExtractError> {
        let root = document
            .select(&self.content)
            .next()
            .ok_or_else(|| ExtractError::MissingElement {
                selector: self.content_source.clone(),
                url: url.to_string(),
            })?;
        Ok(collect_text(root))
    }

    fn extract_next_url(&self, document: &Html, url: &str) -> Result<Option<String>, ExtractError> {
        let href = document
            .select(&self.next)
            .next()
            .and_then(|element| element.value().attr(&self.next_attribute))
            .map(str::trim)
            .filter(|href| !href.is_empty());

        let Some(href) = href else {
            return Ok(None);
        };

        let invalid = |message: String| ExtractError::InvalidNextUrl {
            href: href.to_string(),
            url: url.to_string(),
            message,
        };

        // Relative links resolve against the page they were found on, and
        // relative page URLs against the site base
        let page = self.base.join(url).map_err(|e| invalid(e.to_string()))?;
        let next = page.join(href).map_err(|e| invalid(e.to_string()))?;

        // A chain walked with relative URLs stays relative
        let page_is_relative = Url::parse(url).is_err();
        if page_is_relative && next.origin() == self.base.origin() {
            return Ok(Some(next[Position::BeforePath..].to_string()));
        }
        Ok(Some(next.to_string()))
    }
}

impl ContentExtractor for HtmlExtractor {
    fn extract(&self, content: &str, url: &str) -> Result<Extracted, ExtractError> {
        let document = Html::parse_document(content);

        let title = self.extract_title(&document, url)?;
        let paragraphs = self.extract_paragraphs(&document, url)?;
        let next_url = self.extract_next_url(&document, url)?;

        tracing::info!(
            "Content processed for chapter '{}' ({} paragraphs)",
            title,
            paragraphs.len()
        );

        Ok(Extracted {
            next_url,
            unit: ContentUnit::from_paragraphs(title, paragraphs, url),
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Collects the narrative text under `root`, in document order
///
/// Walks the subtree with an explicit stack, so nesting depth is bounded
/// only by memory. Any element carrying a `class` attribute is skipped
/// together with its whole subtree (ads, navigation, notes); every other
/// non-blank text node becomes one paragraph.
pub fn collect_text(root: ElementRef<'_>) -> Vec<String> {
    let mut paragraphs = Vec::new();

    let mut stack: Vec<_> = root.children().collect();
    stack.reverse();

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    paragraphs.push(text.to_string());
                }
            }
            Node::Element(element) => {
                if element.attr("class").is_some() {
                    continue;
                }
                let children: Vec<_> = node.children().collect();
                stack.extend(children.into_iter().rev());
            }
            _ => {}
        }
    }

    paragraphs
}
