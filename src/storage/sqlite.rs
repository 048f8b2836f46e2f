//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::PageRecord;
use crate::graph::{LinkRow, JOIN_DELIMITER};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use crate::SurveyError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(SurveyError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, SurveyError> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, SurveyError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, params![run_id], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        seed_url: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Failed),
        pages_visited: row.get::<_, i64>(6)?.max(0) as u64,
    })
}

fn split_excerpts(joined: String) -> Vec<String> {
    if joined.is_empty() {
        Vec::new()
    } else {
        joined.split(JOIN_DELIMITER).map(str::to_string).collect()
    }
}

const RUN_COLUMNS: &str =
    "id, seed_url, started_at, finished_at, config_hash, status, pages_visited";

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (seed_url, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![seed_url, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_visited: usize,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_visited = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, pages_visited as i64, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Page Metadata =====

    fn insert_page(&mut self, run_id: i64, page: &PageRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR REPLACE INTO pages
             (run_id, url, title, description, h1, h2, canonical_url,
              canonical_matches, from_sitemap_only, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                run_id,
                page.url,
                page.title,
                page.description,
                page.h1_excerpts.join(JOIN_DELIMITER),
                page.h2_excerpts.join(JOIN_DELIMITER),
                page.canonical_url,
                page.canonical_matches_url,
                page.from_sitemap_only,
                now
            ],
        )?;
        Ok(())
    }

    fn get_pages(&self, run_id: i64) -> StorageResult<Vec<PageRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, title, description, h1, h2, canonical_url,
             canonical_matches, from_sitemap_only
             FROM pages WHERE run_id = ?1 ORDER BY id",
        )?;

        let pages = stmt
            .query_map(params![run_id], |row| {
                Ok(PageRecord {
                    url: row.get(0)?,
                    title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    h1_excerpts: split_excerpts(row.get(3)?),
                    h2_excerpts: split_excerpts(row.get(4)?),
                    canonical_url: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    canonical_matches_url: row.get(6)?,
                    from_sitemap_only: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    // ===== Link Statistics =====

    fn replace_links(&mut self, run_id: i64, rows: &[LinkRow]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM links WHERE run_id = ?1", params![run_id])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO links (run_id, destination_url, inbound_count, source_urls, anchor_texts)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in rows {
                stmt.execute(params![
                    run_id,
                    row.url,
                    row.inbound_count as i64,
                    row.source_urls,
                    row.anchor_texts
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn get_top_linked(&self, run_id: i64, limit: usize) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT destination_url, inbound_count FROM links
             WHERE run_id = ?1 ORDER BY inbound_count DESC, id ASC LIMIT ?2",
        )?;

        let rows = stmt
            .query_map(params![run_id, limit as i64], |row| {
                Ok((row.get(0)?, row.get::<_, i64>(1)?.max(0) as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    // ===== Statistics =====

    fn count_pages(&self, run_id: i64) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM pages WHERE run_id = ?1", run_id)
    }

    fn count_sitemap_only_pages(&self, run_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM pages WHERE run_id = ?1 AND from_sitemap_only = 1",
            run_id,
        )
    }

    fn count_pages_missing_title(&self, run_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM pages WHERE run_id = ?1 AND (title IS NULL OR title = '')",
            run_id,
        )
    }

    fn count_pages_missing_description(&self, run_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM pages WHERE run_id = ?1
             AND (description IS NULL OR description = '')",
            run_id,
        )
    }

    fn count_canonical_mismatches(&self, run_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COUNT(*) FROM pages WHERE run_id = ?1 AND canonical_matches = 0",
            run_id,
        )
    }

    fn count_link_destinations(&self, run_id: i64) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM links WHERE run_id = ?1", run_id)
    }

    fn count_edges(&self, run_id: i64) -> StorageResult<u64> {
        self.count(
            "SELECT COALESCE(SUM(inbound_count), 0) FROM links WHERE run_id = ?1",
            run_id,
        )
    }
}
