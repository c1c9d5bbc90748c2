//! Final handoff of a run's records to durable outputs.

use anyhow::{Context, Result};
use shared::db::Database;
use shared::export::write_csv;
use shared::{AnimeRecord, DataPaths};
use std::path::PathBuf;
use tracing::{info, warn};

/// What the sink did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOutcome {
    /// No records, no files touched
    NothingToPersist,
    Persisted {
        csv_rows: usize,
        db_rows: i64,
        csv_path: PathBuf,
        db_path: PathBuf,
    },
}

/// Writes the CSV export and the SQLite table
#[derive(Debug, Clone)]
pub struct ResultSink {
    csv_path: PathBuf,
    db_path: PathBuf,
}

impl ResultSink {
    pub fn new(csv_path: impl Into<PathBuf>, db_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            db_path: db_path.into(),
        }
    }

    /// Persist the full, ordered record set
    pub fn persist(&self, records: Vec<AnimeRecord>) -> Result<SinkOutcome> {
        if records.is_empty() {
            warn!("No data fetched, nothing to persist");
            return Ok(SinkOutcome::NothingToPersist);
        }

        DataPaths::ensure_parent(&self.csv_path).with_context(|| {
            format!("Failed to create directory for {}", self.csv_path.display())
        })?;
        DataPaths::ensure_parent(&self.db_path).with_context(|| {
            format!("Failed to create directory for {}", self.db_path.display())
        })?;

        let csv_rows = write_csv(&self.csv_path, &records).context("Failed to write CSV export")?;

        let mut database = Database::open(&self.db_path).context("Failed to open output database")?;
        let db_rows = database
            .replace_top_anime(&records)
            .context("Failed to write ranking table")?;

        info!(
            csv = %self.csv_path.display(),
            db = %self.db_path.display(),
            csv_rows = csv_rows,
            db_rows = db_rows,
            "Results persisted"
        );

        Ok(SinkOutcome::Persisted {
            csv_rows,
            db_rows,
            csv_path: self.csv_path.clone(),
            db_path: self.db_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn records(ids: impl IntoIterator<Item = u32>) -> Vec<AnimeRecord> {
        ids.into_iter()
            .map(|id| AnimeRecord::new(id, id, format!("Anime {}", id)))
            .collect()
    }

    #[test]
    fn test_empty_input_writes_nothing() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let csv_path = temp_dir.path().join("out.csv");
        let db_path = temp_dir.path().join("out.db");

        let outcome = ResultSink::new(&csv_path, &db_path).persist(Vec::new())?;

        assert_eq!(outcome, SinkOutcome::NothingToPersist);
        assert!(!csv_path.exists());
        assert!(!db_path.exists());
        Ok(())
    }

    #[test]
    fn test_writes_both_outputs_into_missing_dirs() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let csv_path = temp_dir.path().join("exports").join("out.csv");
        let db_path = temp_dir.path().join("db").join("out.db");

        let outcome = ResultSink::new(&csv_path, &db_path).persist(records(1..=3))?;

        match outcome {
            SinkOutcome::Persisted { csv_rows, db_rows, .. } => {
                assert_eq!(csv_rows, 3);
                assert_eq!(db_rows, 3);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(csv_path.exists());
        assert!(db_path.exists());
        Ok(())
    }

    #[test]
    fn test_rerun_overwrites_previous_outputs() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let csv_path = temp_dir.path().join("out.csv");
        let db_path = temp_dir.path().join("out.db");
        let sink = ResultSink::new(&csv_path, &db_path);

        sink.persist(records(1..=10))?;
        sink.persist(records(1..=4))?;

        let database = Database::open(&db_path)?;
        assert_eq!(database.count_records()?, 4);
        let csv_lines = std::fs::read_to_string(&csv_path)?.lines().count();
        assert_eq!(csv_lines, 5);
        Ok(())
    }
}
