//! CSV export of the ranking.

use crate::models::AnimeRecord;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Write records to a CSV file, header first, in the given order
///
/// The header row is derived from `AnimeRecord`'s field names; values that
/// contain commas, quotes or newlines are quoted. Returns the number of data rows.
pub fn write_csv(path: impl AsRef<Path>, records: &[AnimeRecord]) -> Result<usize> {
    let path = path.as_ref();

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    for record in records {
        writer
            .serialize(record)
            .with_context(|| format!("Failed to write CSV row for anime {}", record.mal_id))?;
    }

    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;

    info!(path = %path.display(), rows = records.len(), "CSV export written");
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RECORD_FIELDS;
    use tempfile::TempDir;

    #[test]
    fn test_header_and_rows() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("top.csv");

        let mut first = AnimeRecord::new(5114, 1, "Fullmetal Alchemist: Brotherhood");
        first.genres = "Action, Adventure, Drama".to_string();
        first.score = Some(9.1);
        let second = AnimeRecord::new(9253, 2, "Steins;Gate");

        let rows = write_csv(&path, &[first, second])?;
        assert_eq!(rows, 2);

        let mut reader = csv::Reader::from_path(&path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        assert_eq!(headers, RECORD_FIELDS.to_vec());

        let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>()?;
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "5114");
        assert_eq!(&rows[0][19], "Action, Adventure, Drama");
        assert_eq!(&rows[1][2], "Steins;Gate");
        // Absent values are empty cells
        assert_eq!(&rows[1][14], "");

        Ok(())
    }

    #[test]
    fn test_fields_with_delimiters_are_quoted() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("top.csv");

        let mut record = AnimeRecord::new(1, 1, "Title, with \"quotes\"");
        record.synopsis = Some("line one\nline two".to_string());
        write_csv(&path, &[record])?;

        let raw = std::fs::read_to_string(&path)?;
        assert!(raw.contains("\"Title, with \"\"quotes\"\"\""));

        let mut reader = csv::Reader::from_path(&path)?;
        let row = reader.records().next().unwrap()?;
        assert_eq!(&row[2], "Title, with \"quotes\"");
        assert_eq!(&row[18], "line one\nline two");

        Ok(())
    }
}
