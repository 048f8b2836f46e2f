//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::PageRecord;
use crate::graph::LinkRow;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("No crawl runs recorded")]
    NoRuns,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed to persist one survey
/// run and to report on it later.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `seed_url` - The URL the crawl starts from
    /// * `config_hash` - Hash of the effective configuration
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run finished with its final status and visited page count
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_visited: usize,
    ) -> StorageResult<()>;

    // ===== Page Metadata =====

    /// Stores the metadata record for one processed page
    ///
    /// A second record for the same URL within a run replaces the first.
    fn insert_page(&mut self, run_id: i64, page: &PageRecord) -> StorageResult<()>;

    /// Gets every page record of a run in insertion order
    fn get_pages(&self, run_id: i64) -> StorageResult<Vec<PageRecord>>;

    // ===== Link Statistics =====

    /// Replaces the link rows of a run with `rows`
    fn replace_links(&mut self, run_id: i64, rows: &[LinkRow]) -> StorageResult<()>;

    /// Gets destinations ordered by inbound count (highest first)
    fn get_top_linked(&self, run_id: i64, limit: usize) -> StorageResult<Vec<(String, u64)>>;

    // ===== Statistics =====

    /// Counts the page records of a run
    fn count_pages(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts page records that were reached only through the sitemap
    fn count_sitemap_only_pages(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts page records without a title
    fn count_pages_missing_title(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts page records without a meta description
    fn count_pages_missing_description(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts page records whose canonical URL differs from the page URL
    fn count_canonical_mismatches(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts link destinations of a run
    fn count_link_destinations(&self, run_id: i64) -> StorageResult<u64>;

    /// Sums inbound counts over all destinations of a run
    fn count_edges(&self, run_id: i64) -> StorageResult<u64>;
}
