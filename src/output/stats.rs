//! Statistics generation from the survey database
//!
//! This module provides functionality for extracting and displaying
//! run statistics from the storage layer.

use crate::storage::{RunRecord, Storage, StorageError};
use crate::SurveyError;

/// How many destinations `--stats` lists
const TOP_LINKED_SHOWN: usize = 10;

/// Statistics for one recorded run
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// The run these numbers describe
    pub run: RunRecord,

    /// Page records stored for the run
    pub pages_recorded: u64,

    /// Pages reached only through the sitemap
    pub sitemap_only_pages: u64,

    /// URLs of those pages, in the order they were recorded
    pub sitemap_only_urls: Vec<String>,

    /// Pages without a `<title>`
    pub missing_titles: u64,

    /// Pages without a meta description
    pub missing_descriptions: u64,

    /// Pages whose canonical URL is not the page URL
    pub canonical_mismatches: u64,

    /// Distinct link destinations
    pub link_destinations: u64,

    /// Total counted internal links
    pub total_links: u64,

    /// Most linked destinations
    pub top_linked: Vec<(String, u64)>,
}

/// Loads statistics for one run
///
/// # Arguments
///
/// * `storage` - The storage backend to query
/// * `run_id` - The run to describe; the most recent run when `None`
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(SurveyError)` - No such run, or a query failed
pub fn load_statistics(
    storage: &dyn Storage,
    run_id: Option<i64>,
) -> Result<CrawlStatistics, SurveyError> {
    let run = match run_id {
        Some(id) => storage.get_run(id)?,
        None => storage.get_latest_run()?.ok_or(StorageError::NoRuns)?,
    };
    let run_id = run.id;

    let sitemap_only_urls = storage
        .get_pages(run_id)?
        .into_iter()
        .filter(|page| page.from_sitemap_only)
        .map(|page| page.url)
        .collect();

    Ok(CrawlStatistics {
        pages_recorded: storage.count_pages(run_id)?,
        sitemap_only_pages: storage.count_sitemap_only_pages(run_id)?,
        sitemap_only_urls,
        missing_titles: storage.count_pages_missing_title(run_id)?,
        missing_descriptions: storage.count_pages_missing_description(run_id)?,
        canonical_mismatches: storage.count_canonical_mismatches(run_id)?,
        link_destinations: storage.count_link_destinations(run_id)?,
        total_links: storage.count_edges(run_id)?,
        top_linked: storage.get_top_linked(run_id, TOP_LINKED_SHOWN)?,
        run,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Survey Statistics ===\n");

    println!("Run {}:", stats.run.id);
    println!("  Seed URL: {}", stats.run.seed_url);
    println!("  Status: {}", stats.run.status.to_db_string());
    println!("  Started: {}", stats.run.started_at);
    if let Some(finished) = &stats.run.finished_at {
        println!("  Finished: {}", finished);
    }
    println!("  Pages visited: {}", stats.run.pages_visited);
    println!();

    println!("Pages:");
    println!("  Records stored: {}", stats.pages_recorded);
    println!("  Sitemap only: {}", stats.sitemap_only_pages);
    println!("  Missing title: {}", stats.missing_titles);
    println!("  Missing description: {}", stats.missing_descriptions);
    println!("  Canonical mismatch: {}", stats.canonical_mismatches);
    println!();

    println!("Links:");
    println!("  Linked destinations: {}", stats.link_destinations);
    println!("  Internal links: {}", stats.total_links);

    if !stats.sitemap_only_urls.is_empty() {
        println!();
        println!("Found Only in Sitemap:");
        for url in &stats.sitemap_only_urls {
            println!("  {}", url);
        }
    }

    if !stats.top_linked.is_empty() {
        println!();
        println!("Most Linked Pages:");
        for (url, count) in &stats.top_linked {
            println!("  {:>5}  {}", count, url);
        }
    }
}
