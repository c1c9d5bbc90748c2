//! Database operations for SQLite.
//!
//! The ranking table is a snapshot: every write drops and recreates it, then
//! rebuilds the lookup indexes, all inside one transaction.

use crate::models::AnimeRecord;
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::{debug, info};

/// Name of the ranking table
pub const TOP_ANIME_TABLE: &str = "top_anime";

/// Database connection wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        debug!(path = %path.display(), "Opening database");

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;

        Ok(Self { conn })
    }

    /// Open a throwaway in-memory database
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Ok(Self { conn })
    }

    /// Get a reference to the underlying connection
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Check if a table exists
    #[cfg(test)]
    pub fn table_exists(&self, table_name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Check if an index exists
    #[cfg(test)]
    pub fn index_exists(&self, index_name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name=?1",
            [index_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Count rows in the ranking table
    pub fn count_records(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM top_anime", [], |row| row.get(0))
            .context("Failed to count ranking rows")?;
        Ok(count)
    }

    /// Replace the ranking table with the given records
    ///
    /// Drops any previous table, recreates it, inserts every record (a repeated
    /// `mal_id` overwrites the earlier row) and rebuilds the indexes. Returns
    /// the number of rows in the table afterwards.
    pub fn replace_top_anime(&mut self, records: &[AnimeRecord]) -> Result<i64> {
        let tx = self.conn.transaction().context("Failed to begin transaction")?;

        tx.execute_batch(include_str!("../schema.sql"))
            .context("Failed to recreate ranking table")?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR REPLACE INTO top_anime (
                        rank, mal_id, title, title_english, title_japanese,
                        type, episodes, status, aired, season, year,
                        source, duration, rating,
                        score, scored_by, members, favorites,
                        synopsis, genres, themes, studios, url, image_url
                    ) VALUES (
                        ?1, ?2, ?3, ?4, ?5,
                        ?6, ?7, ?8, ?9, ?10, ?11,
                        ?12, ?13, ?14,
                        ?15, ?16, ?17, ?18,
                        ?19, ?20, ?21, ?22, ?23, ?24
                    )",
                )
                .context("Failed to prepare insert")?;

            for record in records {
                stmt.execute(params![
                    record.rank,
                    record.mal_id,
                    record.title,
                    record.title_english,
                    record.title_japanese,
                    record.anime_type,
                    record.episodes,
                    record.status,
                    record.aired,
                    record.season,
                    record.year,
                    record.source,
                    record.duration,
                    record.rating,
                    record.score,
                    record.scored_by,
                    record.members,
                    record.favorites,
                    record.synopsis,
                    record.genres,
                    record.themes,
                    record.studios,
                    record.url,
                    record.image_url,
                ])
                .with_context(|| format!("Failed to insert anime {}", record.mal_id))?;
            }
        }

        tx.execute_batch(include_str!("../indexes.sql"))
            .context("Failed to create ranking indexes")?;

        tx.commit().context("Failed to commit ranking table")?;

        let rows = self.count_records()?;
        info!(table = TOP_ANIME_TABLE, rows = rows, "Ranking table written");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(mal_id: u32, rank: u32, title: &str) -> AnimeRecord {
        AnimeRecord::new(mal_id, rank, title)
    }

    #[test]
    fn test_replace_creates_table_and_indexes() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("test.db");

        let mut db = Database::open(&db_path)?;
        let rows = db.replace_top_anime(&[record(5114, 1, "FMA:B"), record(9253, 2, "Steins;Gate")])?;

        assert!(db_path.exists());
        assert_eq!(rows, 2);
        assert!(db.table_exists(TOP_ANIME_TABLE)?);
        for index in ["idx_score", "idx_members", "idx_type", "idx_year"] {
            assert!(db.index_exists(index)?, "missing index {}", index);
        }

        Ok(())
    }

    #[test]
    fn test_rewrite_replaces_previous_contents() -> Result<()> {
        let mut db = Database::open_in_memory()?;

        db.replace_top_anime(&[record(1, 1, "a"), record(2, 2, "b"), record(3, 3, "c")])?;
        let rows = db.replace_top_anime(&[record(4, 1, "d")])?;

        assert_eq!(rows, 1);
        let title: String = db
            .conn()
            .query_row("SELECT title FROM top_anime WHERE mal_id = 4", [], |row| row.get(0))?;
        assert_eq!(title, "d");

        Ok(())
    }

    #[test]
    fn test_duplicate_id_keeps_last_row() -> Result<()> {
        let mut db = Database::open_in_memory()?;

        let rows = db.replace_top_anime(&[record(7, 1, "old"), record(7, 2, "new")])?;

        assert_eq!(rows, 1);
        let (rank, title): (u32, String) = db.conn().query_row(
            "SELECT rank, title FROM top_anime WHERE mal_id = 7",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        assert_eq!((rank, title.as_str()), (2, "new"));

        Ok(())
    }

    #[test]
    fn test_optional_fields_round_trip_as_null() -> Result<()> {
        let mut db = Database::open_in_memory()?;
        let mut full = record(20, 1, "Naruto");
        full.score = Some(8.01);
        full.members = Some(2_900_000);
        full.genres = "Action, Adventure".to_string();
        db.replace_top_anime(&[full, record(21, 2, "Unscored")])?;

        let score: Option<f64> = db
            .conn()
            .query_row("SELECT score FROM top_anime WHERE mal_id = 21", [], |row| row.get(0))?;
        assert_eq!(score, None);

        let genres: String = db
            .conn()
            .query_row("SELECT genres FROM top_anime WHERE mal_id = 20", [], |row| row.get(0))?;
        assert_eq!(genres, "Action, Adventure");

        Ok(())
    }
}
