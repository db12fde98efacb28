//! Checkpoint statistics
//!
//! Summarizes what a checkpoint holds, for the `--list` mode.

use crate::checkpoint::CheckpointRecord;

/// Overview of one checkpoint log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointStatistics {
    /// Checkpoint id
    pub checkpoint_id: String,

    /// Number of chapters stored
    pub chapters: usize,

    /// Total characters of chapter text
    pub total_chars: usize,

    /// (title, source URL) per chapter, in fetch order
    pub titles: Vec<(String, String)>,

    /// Where a resume would continue, if the last page declared a successor
    pub resume_url: Option<String>,
}

/// Builds statistics from rebuilt records
pub fn checkpoint_statistics(
    checkpoint_id: &str,
    records: &[CheckpointRecord],
) -> CheckpointStatistics {
    CheckpointStatistics {
        checkpoint_id: checkpoint_id.to_string(),
        chapters: records.len(),
        total_chars: records.iter().map(|r| r.unit.body().chars().count()).sum(),
        titles: records
            .iter()
            .map(|r| (r.unit.title().to_string(), r.unit.source_url().to_string()))
            .collect(),
        resume_url: records.last().and_then(|r| r.next_url.clone()),
    }
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &CheckpointStatistics) {
    println!("=== Checkpoint {} ===\n", stats.checkpoint_id);
    println!("Chapters: {}", stats.chapters);
    println!("Characters: {}", stats.total_chars);
    match &stats.resume_url {
        Some(url) => println!("Resume URL: {}", url),
        None => println!("Resume URL: (none, chain complete or unknown)"),
    }

    if !stats.titles.is_empty() {
        println!("\nChapters:");
        for (index, (title, url)) in stats.titles.iter().enumerate() {
            if url.is_empty() {
                println!("  {:>4}. {}", index + 1, title);
            } else {
                println!("  {:>4}. {} ({})", index + 1, title, url);
            }
        }
    }
}
