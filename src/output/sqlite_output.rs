//! SQLite-based output handler implementation
//!
//! This module provides an output handler that records a survey run directly
//! to the SQLite storage backend.

use crate::crawler::{CrawlReport, PageRecord};
use crate::graph::LinkRow;
use crate::output::traits::{OutputHandler, OutputResult};
use crate::storage::Storage;

/// SQLite-based output handler
///
/// One handler owns one run row: it is created in the `running` state when
/// the handler starts and closed with the final status in `finalize`.
pub struct SqliteOutputHandler<S: Storage + Send> {
    storage: S,
    run_id: i64,
}

impl<S: Storage + Send> SqliteOutputHandler<S> {
    /// Creates a new run and a handler writing into it
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `seed_url` - Seed URL recorded with the run
    /// * `config_hash` - Configuration hash recorded with the run
    pub fn start(mut storage: S, seed_url: &str, config_hash: &str) -> OutputResult<Self> {
        let run_id = storage.create_run(seed_url, config_hash)?;
        tracing::info!("Recording survey as run {}", run_id);
        Ok(Self { storage, run_id })
    }

    /// The run this handler writes into
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// The underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage + Send> OutputHandler for SqliteOutputHandler<S> {
    fn record_page(&mut self, page: &PageRecord) -> OutputResult<()> {
        self.storage.insert_page(self.run_id, page)?;
        Ok(())
    }

    fn record_links(&mut self, rows: &[LinkRow]) -> OutputResult<()> {
        self.storage.replace_links(self.run_id, rows)?;
        Ok(())
    }

    fn finalize(&mut self, report: &CrawlReport) -> OutputResult<()> {
        self.storage
            .finish_run(self.run_id, report.status(), report.visited.len())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LinkGraph;
    use crate::storage::{RunStatus, SqliteStorage};
    use chrono::Utc;

    fn report(cancelled: bool) -> CrawlReport {
        let mut link_graph = LinkGraph::new();
        link_graph.record_edge("https://example.com/", "https://example.com/a", "A");

        CrawlReport {
            seed_url: "https://example.com/".to_string(),
            visited: vec![
                "https://example.com/".to_string(),
                "https://example.com/a".to_string(),
            ],
            primary_visited: 2,
            link_graph,
            pages: Vec::new(),
            sitemap_only: Vec::new(),
            failures: Vec::new(),
            cancelled,
            output_error: None,
            started_at: Utc::now(),
            finished_at: Utc::now(),
        }
    }

    fn page(url: &str) -> PageRecord {
        PageRecord {
            url: url.to_string(),
            title: "Title".to_string(),
            description: String::new(),
            h1_excerpts: Vec::new(),
            h2_excerpts: Vec::new(),
            canonical_url: String::new(),
            canonical_matches_url: false,
            from_sitemap_only: false,
        }
    }

    #[test]
    fn test_start_creates_running_run() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let handler = SqliteOutputHandler::start(storage, "https://example.com/", "abc").unwrap();

        let run = handler.storage().get_run(handler.run_id()).unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(run.config_hash, "abc");
    }

    #[test]
    fn test_records_pages_links_and_final_status() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let mut handler =
            SqliteOutputHandler::start(storage, "https://example.com/", "abc").unwrap();

        let report = report(false);
        handler.record_page(&page("https://example.com/")).unwrap();
        handler.record_page(&page("https://example.com/a")).unwrap();
        handler.record_links(&report.link_graph.export()).unwrap();
        handler.finalize(&report).unwrap();

        let run_id = handler.run_id();
        let storage = handler.storage();
        assert_eq!(storage.count_pages(run_id).unwrap(), 2);
        assert_eq!(storage.count_edges(run_id).unwrap(), 1);

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.pages_visited, 2);
    }

    #[test]
    fn test_cancelled_run_status() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let mut handler =
            SqliteOutputHandler::start(storage, "https://example.com/", "abc").unwrap();

        handler.finalize(&report(true)).unwrap();

        let run = handler.storage().get_run(handler.run_id()).unwrap();
        assert_eq!(run.status, RunStatus::Cancelled);
    }

    #[test]
    fn test_output_failure_marks_run_failed() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        let mut handler =
            SqliteOutputHandler::start(storage, "https://example.com/", "abc").unwrap();

        let mut report = report(false);
        report.output_error = Some("Output error: disk full".to_string());
        handler.finalize(&report).unwrap();

        let run = handler.storage().get_run(handler.run_id()).unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.finished_at.is_some());
    }
}
