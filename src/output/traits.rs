//! Output handler traits and types
//!
//! This module defines the trait interface every output sink implements and
//! the summary structure rendered at the end of a run.

use crate::crawler::{CrawlReport, PageRecord};
use crate::graph::LinkRow;
use thiserror::Error;

/// How many destinations the summary lists by inbound count
pub const TOP_LINKED_LIMIT: usize = 20;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary statistics for a finished crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    // Run metadata
    pub seed_url: String,
    pub started_at: String,
    pub finished_at: String,
    pub duration_seconds: u64,
    pub status: String,
    pub config_hash: String,

    // Overall statistics
    pub pages_visited: usize,
    pub primary_visited: usize,
    pub link_destinations: usize,
    pub total_edges: usize,
    pub failures: Vec<(String, String)>,

    // Audit findings
    pub sitemap_only: Vec<String>,
    pub top_linked: Vec<(String, usize)>,
    pub orphan_pages: Vec<String>,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the summary of a finished crawl
    pub fn from_report(report: &CrawlReport, config_hash: &str) -> Self {
        let duration_seconds = (report.finished_at - report.started_at)
            .num_seconds()
            .max(0) as u64;

        Self {
            seed_url: report.seed_url.clone(),
            started_at: report.started_at.to_rfc3339(),
            finished_at: report.finished_at.to_rfc3339(),
            duration_seconds,
            status: report.status().to_db_string().to_string(),
            config_hash: config_hash.to_string(),
            pages_visited: report.visited.len(),
            primary_visited: report.primary_visited,
            link_destinations: report.link_graph.len(),
            total_edges: report.link_graph.edge_count(),
            failures: report
                .failures
                .iter()
                .map(|f| (f.url.clone(), f.message.clone()))
                .collect(),
            sitemap_only: report.sitemap_only.clone(),
            top_linked: report
                .link_graph
                .top_destinations(TOP_LINKED_LIMIT)
                .into_iter()
                .map(|record| (record.url.clone(), record.inbound_count))
                .collect(),
            orphan_pages: report.orphan_pages().into_iter().map(str::to_string).collect(),
        }
    }

    /// Pages fetched successfully as a percentage of attempted pages
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_visited + self.failures.len();
        if attempted == 0 {
            return 0.0;
        }
        (self.pages_visited as f64 / attempted as f64) * 100.0
    }
}

/// Trait for output handlers
///
/// The crawl engine calls `record_text` and (when page records are wanted)
/// `record_page` once per processed page, `record_links` once at the end of
/// the run, then `finalize`. Every method defaults to a no-op so sinks only
/// implement what they store. Any error is fatal to the run.
pub trait OutputHandler: Send {
    /// Records the extracted text of a processed page
    fn record_text(&mut self, _url: &str, _text: &str) -> OutputResult<()> {
        Ok(())
    }

    /// Records the metadata of a processed page
    fn record_page(&mut self, _page: &PageRecord) -> OutputResult<()> {
        Ok(())
    }

    /// Records the exported link graph
    fn record_links(&mut self, _rows: &[LinkRow]) -> OutputResult<()> {
        Ok(())
    }

    /// Finalizes the output, performing any cleanup or final writes
    fn finalize(&mut self, _report: &CrawlReport) -> OutputResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_summary_new() {
        let summary = CrawlSummary::new();
        assert_eq!(summary.pages_visited, 0);
        assert!(summary.top_linked.is_empty());
    }

    #[test]
    fn test_success_rate() {
        let mut summary = CrawlSummary::new();
        summary.pages_visited = 8;
        summary.failures = vec![
            ("https://example.com/x".to_string(), "HTTP 404".to_string()),
            ("https://example.com/y".to_string(), "timeout".to_string()),
        ];

        let rate = summary.success_rate();
        assert!((rate - 80.0).abs() < 0.01);
    }

    #[test]
    fn test_success_rate_zero_pages() {
        let summary = CrawlSummary::new();
        assert_eq!(summary.success_rate(), 0.0);
    }
}
