//! Single-file HTML book
//!
//! One document with a table of contents and one `<section>` per chapter.

use crate::checkpoint::ContentUnit;
use crate::output::traits::{BookAssembler, OutputResult};
use crate::output::{book_path, ensure_chapters};
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

/// Writes `<book-dir>/<title>.html`
#[derive(Debug, Clone)]
pub struct HtmlBook {
    dir: PathBuf,
    author: String,
}

impl HtmlBook {
    pub fn new(dir: impl Into<PathBuf>, author: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            author: author.into(),
        }
    }
}

impl BookAssembler for HtmlBook {
    fn assemble(&self, units: &[ContentUnit], title: &str) -> OutputResult<PathBuf> {
        ensure_chapters(units)?;
        fs::create_dir_all(&self.dir)?;

        let path = book_path(&self.dir, title, "html")?;
        let html = format_html_book(units, title, &self.author);

        let mut file = File::create(&path)?;
        file.write_all(html.as_bytes())?;
        file.flush()?;

        tracing::info!("Wrote {} chapters to {}", units.len(), path.display());
        Ok(path)
    }
}

/// Formats the whole book as an HTML document
pub fn format_html_book(units: &[ContentUnit], title: &str, author: &str) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", encode_text(title)));
    html.push_str(&format!(
        "<meta name=\"author\" content=\"{}\">\n",
        encode_double_quoted_attribute(author)
    ));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", encode_text(title)));
    html.push_str(&format!("<p class=\"author\">{}</p>\n", encode_text(author)));

    // Table of contents
    html.push_str("<nav>\n<ol>\n");
    for (index, unit) in units.iter().enumerate() {
        html.push_str(&format!(
            "<li><a href=\"#chapter-{}\">{}</a></li>\n",
            index + 1,
            encode_text(unit.title())
        ));
    }
    html.push_str("</ol>\n</nav>\n");

    for (index, unit) in units.iter().enumerate() {
        html.push_str(&format!("<section id=\"chapter-{}\">\n", index + 1));
        html.push_str(&format!("<h2>{}</h2>\n", encode_text(unit.title())));
        for paragraph in unit.paragraphs() {
            html.push_str(&format!("<p>{}</p>\n", encode_text(paragraph)));
        }
        html.push_str("</section>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
