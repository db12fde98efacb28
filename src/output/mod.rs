//! Output module for binding chapters into a book
//!
//! This module handles:
//! - Writing the finished book as EPUB, HTML or markdown
//! - Naming the book file after its title
//! - Summarizing checkpoint contents

mod epub;
mod html;
mod markdown;
pub mod stats;
mod traits;

pub use epub::{format_chapter_xhtml, EpubBook};
pub use html::{format_html_book, HtmlBook};
pub use markdown::{format_markdown_book, MarkdownBook};
pub use stats::{checkpoint_statistics, print_statistics, CheckpointStatistics};
pub use traits::{BookAssembler, OutputError, OutputResult};

use crate::checkpoint::ContentUnit;
use crate::config::{BookFormat, OutputConfig};
use std::path::{Path, PathBuf};

/// Builds the assembler selected by the output configuration
pub fn assembler_for(config: &OutputConfig) -> Box<dyn BookAssembler> {
    match config.format {
        BookFormat::Epub => Box::new(EpubBook::new(&config.book_dir, &config.author)),
        BookFormat::Html => Box::new(HtmlBook::new(&config.book_dir, &config.author)),
        BookFormat::Markdown => Box::new(MarkdownBook::new(&config.book_dir, &config.author)),
    }
}

/// Binds `units` into a book titled `title`
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the book file
/// * `Err(OutputError)` - No chapters, or the file could not be written
pub fn assemble_book(
    config: &OutputConfig,
    units: &[ContentUnit],
    title: &str,
) -> OutputResult<PathBuf> {
    tracing::info!("Generating book for {} chapters", units.len());
    assembler_for(config).assemble(units, title)
}

pub(crate) fn ensure_chapters(units: &[ContentUnit]) -> OutputResult<()> {
    if units.is_empty() {
        return Err(OutputError::Empty);
    }
    Ok(())
}

/// `<dir>/<sanitized title>.<extension>`
pub(crate) fn book_path(dir: &Path, title: &str, extension: &str) -> OutputResult<PathBuf> {
    let name = sanitize_file_name(title);
    if name.is_empty() {
        return Err(OutputError::InvalidTitle(title.to_string()));
    }
    Ok(dir.join(format!("{}.{}", name, extension)))
}

/// Replaces characters that are not allowed in file names
pub fn sanitize_file_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    cleaned.trim().trim_matches('.').trim().to_string()
}
