use crate::checkpoint::format::{decode_record, encode_record, split_records, RECORD_DELIMITER};
use crate::checkpoint::traits::{CheckpointError, CheckpointResult, CheckpointStore};
use crate::checkpoint::CheckpointRecord;
use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// File extension of checkpoint logs
pub const CHECKPOINT_EXTENSION: &str = "ckpt";

const MAX_NAME_ATTEMPTS: u32 = 100;

/// Append-only checkpoint file for one session
///
/// The file is opened once in append mode and is the only writer for the
/// session. Each `append` is flushed and synced before it returns.
#[derive(Debug)]
pub struct CheckpointLog {
    id: String,
    path: PathBuf,
    file: File,
    has_content: bool,
}

impl CheckpointLog {
    /// Creates a fresh log for a new session
    ///
    /// The id is derived from the subject and a millisecond timestamp, e.g.
    /// `my-novel-20261018T101500123.ckpt`. The file is created exclusively, so
    /// two sessions never share one; on a name clash a numeric suffix is added.
    pub fn create(dir: &Path, subject: &str) -> CheckpointResult<Self> {
        fs::create_dir_all(dir)?;

        let stem = format!(
            "{}-{}",
            slugify(subject),
            Local::now().format("%Y%m%dT%H%M%S%3f")
        );

        for attempt in 0..MAX_NAME_ATTEMPTS {
            let id = if attempt == 0 {
                format!("{}.{}", stem, CHECKPOINT_EXTENSION)
            } else {
                format!("{}-{}.{}", stem, attempt, CHECKPOINT_EXTENSION)
            };
            let path = dir.join(&id);

            match OpenOptions::new().append(true).create_new(true).open(&path) {
                Ok(file) => {
                    tracing::info!("Created checkpoint {}", path.display());
                    return Ok(Self {
                        id,
                        path,
                        file,
                        has_content: false,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(CheckpointError::NameExhausted(stem))
    }

    /// Reopens an existing log to resume a session
    pub fn open(dir: &Path, id: &str) -> CheckpointResult<Self> {
        validate_id(id)?;
        let path = dir.join(id);
        if !path.is_file() {
            return Err(CheckpointError::NotFound(path));
        }

        let file = OpenOptions::new().append(true).open(&path)?;
        let has_content = file.metadata()?.len() > 0;
        tracing::info!("Reopened checkpoint {}", path.display());

        Ok(Self {
            id: id.to_string(),
            path,
            file,
            has_content,
        })
    }

    /// The checkpoint id (file name inside the checkpoint directory)
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for CheckpointLog {
    fn append(&mut self, record: &CheckpointRecord) -> CheckpointResult<()> {
        let encoded = encode_record(record)?;

        // The delimiter goes before a record, never after, so the file
        // neither starts nor ends with one
        let mut frame = String::with_capacity(encoded.len() + RECORD_DELIMITER.len());
        if self.has_content {
            frame.push_str(RECORD_DELIMITER);
        }
        frame.push_str(&encoded);

        self.file.write_all(frame.as_bytes())?;
        self.file.flush()?;
        self.file.sync_data()?;
        self.has_content = true;

        tracing::debug!(
            "Checkpointed '{}' ({} bytes)",
            record.unit.title(),
            frame.len()
        );
        Ok(())
    }

    fn rebuild(&self) -> CheckpointResult<Vec<CheckpointRecord>> {
        rebuild_path(&self.path)
    }
}

/// Reads every record of the log at `path`, in file order
///
/// A record that cannot be decoded (typically the tail of a write cut short
/// by a crash) is skipped with a warning; its neighbours are unaffected.
pub fn rebuild_path(path: &Path) -> CheckpointResult<Vec<CheckpointRecord>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(CheckpointError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    let content = String::from_utf8_lossy(&bytes);

    let mut records = Vec::new();
    for (index, chunk) in split_records(&content).enumerate() {
        match decode_record(chunk) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(
                    "Skipping unreadable record {} in {}: {}",
                    index,
                    path.display(),
                    e
                );
            }
        }
    }

    tracing::debug!("Rebuilt {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Lists the checkpoint ids in `dir`, oldest name first
pub fn list_checkpoints(dir: &Path) -> CheckpointResult<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_checkpoint = path.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(CHECKPOINT_EXTENSION);
        if is_checkpoint {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                ids.push(name.to_string());
            }
        }
    }
    ids.sort();
    Ok(ids)
}

fn validate_id(id: &str) -> CheckpointResult<()> {
    let invalid = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains('/')
        || id.contains('\\');
    if invalid {
        return Err(CheckpointError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// Turns a subject name into a file-name-safe slug
fn slugify(subject: &str) -> String {
    let mut slug = String::with_capacity(subject.len());
    let mut last_dash = true;
    for c in subject.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "session".to_string()
    } else {
        slug.to_string()
    }
}
