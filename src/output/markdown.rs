//! Markdown book

use crate::checkpoint::ContentUnit;
use crate::output::traits::{BookAssembler, OutputResult};
use crate::output::{book_path, ensure_chapters};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

/// Writes `<book-dir>/<title>.md`
#[derive(Debug, Clone)]
pub struct MarkdownBook {
    dir: PathBuf,
    author: String,
}

impl MarkdownBook {
    pub fn new(dir: impl Into<PathBuf>, author: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            author: author.into(),
        }
    }
}

impl BookAssembler for MarkdownBook {
    fn assemble(&self, units: &[ContentUnit], title: &str) -> OutputResult<PathBuf> {
        ensure_chapters(units)?;
        fs::create_dir_all(&self.dir)?;

        let path = book_path(&self.dir, title, "md")?;
        let markdown = format_markdown_book(units, title, &self.author);

        let mut file = File::create(&path)?;
        file.write_all(markdown.as_bytes())?;

        tracing::info!("Wrote {} chapters to {}", units.len(), path.display());
        Ok(path)
    }
}

/// Formats the whole book as markdown
pub fn format_markdown_book(units: &[ContentUnit], title: &str, author: &str) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", title));
    md.push_str(&format!("*{}*\n\n", author));

    md.push_str("## Contents\n\n");
    for (index, unit) in units.iter().enumerate() {
        md.push_str(&format!("{}. {}\n", index + 1, unit.title()));
    }
    md.push('\n');

    for unit in units {
        md.push_str(&format!("## {}\n\n", unit.title()));
        for paragraph in unit.paragraphs() {
            md.push_str(paragraph);
            md.push_str("\n\n");
        }
    }

    md
}
