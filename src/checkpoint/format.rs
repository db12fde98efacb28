//! On-disk record framing
//!
//! Records are JSON objects joined by [`RECORD_DELIMITER`]. Every `|` inside
//! the JSON text is written as the JSON escape `\u007c`, so the delimiter cannot
//! occur inside a record and any JSON reader still decodes the original
//! characters.

use crate::checkpoint::CheckpointRecord;

/// Separator written between two records
pub const RECORD_DELIMITER: &str = "||||";

const PIPE_ESCAPE: &str = "\\u007c";

/// Serializes a record to its framed textual form (without delimiter)
pub fn encode_record(record: &CheckpointRecord) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(record)?;
    // '|' only ever appears inside JSON strings, where the escape is valid
    Ok(json.replace('|', PIPE_ESCAPE))
}

/// Deserializes one record chunk
///
/// Stray pipes at either end are left over from a partially written
/// delimiter and are ignored.
pub fn decode_record(raw: &str) -> Result<CheckpointRecord, serde_json::Error> {
    serde_json::from_str(raw.trim().trim_matches('|'))
}

/// Splits a whole log into record chunks, skipping empty ones
pub fn split_records(content: &str) -> impl Iterator<Item = &str> {
    content
        .split(RECORD_DELIMITER)
        .filter(|chunk| !chunk.trim().trim_matches('|').is_empty())
}
