use crate::{
    error::StorageError,
    models::{AnswerRecord, TrackedWord},
};

/// Column order of the persisted word tables
pub const COLUMNS: [&str; 4] = ["Day", "Word", "Meaning", "Date"];
/// Column order of the exported study records
pub const RECORD_COLUMNS: [&str; 3] = ["Word", "Result", "Day"];

/// Parse a `Day,Word,Meaning,Date` table
pub fn decode(text: &str) -> Result<Vec<TrackedWord>, StorageError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for row in reader.deserialize() {
        let row: TrackedWord = row?;
        if row.word.is_empty() {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Render rows as a table. The header is written even when `rows` is empty.
pub fn encode(rows: &[TrackedWord]) -> Result<String, StorageError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }

    finish(writer)
}

/// Render answer records. Records without a Day leave the column empty.
pub fn encode_records(records: &[AnswerRecord]) -> Result<String, StorageError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(RECORD_COLUMNS)?;
    for record in records {
        writer.write_record([
            record.word.as_str(),
            record.result.as_str(),
            record.day.as_deref().unwrap_or_default(),
        ])?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, StorageError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| StorageError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| StorageError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
