//! Crawler module for single-site traversal and link auditing
//!
//! This module contains the crawl engine, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - HTML document access and link classification
//! - The breadth-first frontier with its page budget
//! - Sitemap reconciliation and page metadata extraction
//! - Overall crawl coordination

mod classifier;
mod coordinator;
mod document;
mod fetcher;
mod frontier;
mod metadata;
mod sitemap;

pub use classifier::{is_excluded_by_ancestor, LinkClassification, LinkClassifier, ANCESTOR_DEPTH};
pub use coordinator::{run_survey, CrawlFailure, CrawlReport, CrawlSettings, Crawler};
pub use document::{Document, Node};
pub use fetcher::{build_http_client, fetch_url, Fetcher, HttpFetcher};
pub use frontier::Frontier;
pub use metadata::{extract_page_record, extract_text, PageRecord, HEADING_EXCERPTS};
pub use sitemap::{fetch_sitemap, parse_sitemap, reconcile, sitemap_url};
