//! Page metadata and text extraction
//!
//! Derives the structured [`PageRecord`] exported to tabular sinks and the
//! plain text handed to the text sink.

use crate::crawler::document::Document;

/// How many `<h1>` / `<h2>` texts are kept per page
pub const HEADING_EXCERPTS: usize = 3;

/// Separator between extracted text blocks
const TEXT_BLOCK_SEPARATOR: &str = "\n";

/// Structured fields derived from one processed page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub description: String,
    pub h1_excerpts: Vec<String>,
    pub h2_excerpts: Vec<String>,
    /// Raw `href` of the canonical link element, empty if absent
    pub canonical_url: String,
    /// True iff the canonical href is exactly the page URL
    pub canonical_matches_url: bool,
    /// True iff the page was reached only through sitemap reconciliation
    pub from_sitemap_only: bool,
}

/// Builds the metadata record for a parsed page
pub fn extract_page_record(url: &str, document: &Document, from_sitemap_only: bool) -> PageRecord {
    let canonical_url = document.canonical_href().unwrap_or_default();
    let canonical_matches_url = canonical_url == url;

    PageRecord {
        url: url.to_string(),
        title: document.title().unwrap_or_default(),
        description: document.meta_description().unwrap_or_default(),
        h1_excerpts: document.heading_texts("h1", HEADING_EXCERPTS),
        h2_excerpts: document.heading_texts("h2", HEADING_EXCERPTS),
        canonical_url,
        canonical_matches_url,
        from_sitemap_only,
    }
}

/// Joins the trimmed text of every paragraph, heading and list item
pub fn extract_text(document: &Document) -> String {
    document.text_blocks().join(TEXT_BLOCK_SEPARATOR)
}
