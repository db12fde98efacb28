//! EPUB book
//!
//! One XHTML document per chapter, with a generated table of contents.

use crate::checkpoint::ContentUnit;
use crate::output::traits::{BookAssembler, OutputError, OutputResult};
use crate::output::{book_path, ensure_chapters};
use epub_builder::{EpubBuilder, EpubContent, ReferenceType, ZipLibrary};
use html_escape::encode_text;
use std::fs::{self, File};
use std::path::PathBuf;

/// Writes `<book-dir>/<title>.epub`
#[derive(Debug, Clone)]
pub struct EpubBook {
    dir: PathBuf,
    author: String,
}

impl EpubBook {
    pub fn new(dir: impl Into<PathBuf>, author: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            author: author.into(),
        }
    }
}

impl BookAssembler for EpubBook {
    fn assemble(&self, units: &[ContentUnit], title: &str) -> OutputResult<PathBuf> {
        ensure_chapters(units)?;
        fs::create_dir_all(&self.dir)?;

        let path = book_path(&self.dir, title, "epub")?;

        let mut builder = EpubBuilder::new(ZipLibrary::new().map_err(epub_error)?)
            .map_err(epub_error)?;
        builder
            .metadata("title", title)
            .map_err(epub_error)?
            .metadata("author", self.author.as_str())
            .map_err(epub_error)?
            .metadata("generator", "serial-scribe")
            .map_err(epub_error)?;
        builder.inline_toc();

        for (index, unit) in units.iter().enumerate() {
            let xhtml = format_chapter_xhtml(unit);
            builder
                .add_content(
                    EpubContent::new(chapter_file_name(index), xhtml.as_bytes())
                        .title(unit.title())
                        .reftype(ReferenceType::Text),
                )
                .map_err(epub_error)?;
        }

        let mut file = File::create(&path)?;
        builder.generate(&mut file).map_err(epub_error)?;

        tracing::info!("Wrote {} chapters to {}", units.len(), path.display());
        Ok(path)
    }
}

fn chapter_file_name(index: usize) -> String {
    format!("chapter_{}.xhtml", index + 1)
}

/// Formats one chapter as a standalone XHTML document
pub fn format_chapter_xhtml(unit: &ContentUnit) -> String {
    let title = encode_text(unit.title());

    let mut xhtml = String::new();
    xhtml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xhtml.push_str("<!DOCTYPE html>\n");
    xhtml.push_str("<html xmlns=\"http://www.w3.org/1999/xhtml\"");
    xhtml.push_str(" xmlns:epub=\"http://www.idpf.org/2007/ops\">\n");
    xhtml.push_str(&format!("<head>\n<title>{}</title>\n</head>\n<body>\n", title));
    xhtml.push_str(&format!("<h2>{}</h2>\n", title));
    for paragraph in unit.paragraphs() {
        xhtml.push_str(&format!("<p>{}</p>\n", encode_text(paragraph)));
    }
    xhtml.push_str("</body>\n</html>\n");
    xhtml
}

fn epub_error(error: impl std::fmt::Display) -> OutputError {
    OutputError::Epub(error.to_string())
}
