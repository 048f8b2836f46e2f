//! Link graph aggregation
//!
//! Accumulates inbound-link statistics per destination URL over a whole crawl.
//! Records are created lazily on the first inbound edge and never removed.
//! Iteration and export follow first-seen destination order.

use std::collections::HashMap;

/// Delimiter used when list columns are flattened for tabular export
pub const JOIN_DELIMITER: &str = "|";

/// Inbound-link statistics for one destination URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// Destination URL
    pub url: String,

    /// Number of edges recorded into this destination
    pub inbound_count: usize,

    /// Source page of every edge, duplicates kept
    pub source_urls: Vec<String>,

    /// Distinct anchor texts in first-seen order
    pub anchor_texts: Vec<String>,
}

impl LinkRecord {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            inbound_count: 0,
            source_urls: Vec::new(),
            anchor_texts: Vec::new(),
        }
    }
}

/// One flattened row of the link graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRow {
    pub url: String,
    pub inbound_count: usize,
    pub source_urls: String,
    pub anchor_texts: String,
}

/// Destination-keyed link graph
#[derive(Debug, Default, Clone)]
pub struct LinkGraph {
    index: HashMap<String, usize>,
    records: Vec<LinkRecord>,
}

impl LinkGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one edge `source -> destination`
    ///
    /// The inbound count always grows by one and the source is always appended.
    /// The anchor text is appended only if the destination has not seen that
    /// exact text before.
    pub fn record_edge(&mut self, source: &str, destination: &str, anchor_text: &str) {
        let position = match self.index.get(destination) {
            Some(&position) => position,
            None => {
                self.records.push(LinkRecord::new(destination));
                let position = self.records.len() - 1;
                self.index.insert(destination.to_string(), position);
                position
            }
        };

        let record = &mut self.records[position];
        record.inbound_count += 1;
        record.source_urls.push(source.to_string());
        if !record.anchor_texts.iter().any(|t| t == anchor_text) {
            record.anchor_texts.push(anchor_text.to_string());
        }
    }

    /// Gets the record for a destination
    pub fn get(&self, destination: &str) -> Option<&LinkRecord> {
        self.index.get(destination).map(|&i| &self.records[i])
    }

    /// Returns true if the URL has at least one inbound edge
    pub fn is_destination(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    /// Records in first-seen order
    pub fn records(&self) -> &[LinkRecord] {
        &self.records
    }

    /// Number of distinct destinations
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total number of edges across all destinations
    pub fn edge_count(&self) -> usize {
        self.records.iter().map(|r| r.inbound_count).sum()
    }

    /// Flattens every record into a row, joining lists with [`JOIN_DELIMITER`]
    pub fn export(&self) -> Vec<LinkRow> {
        self.records
            .iter()
            .map(|record| LinkRow {
                url: record.url.clone(),
                inbound_count: record.inbound_count,
                source_urls: record.source_urls.join(JOIN_DELIMITER),
                anchor_texts: record.anchor_texts.join(JOIN_DELIMITER),
            })
            .collect()
    }

    /// Destinations sorted by inbound count, highest first, ties in first-seen order
    pub fn top_destinations(&self, limit: usize) -> Vec<&LinkRecord> {
        let mut sorted: Vec<&LinkRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.inbound_count.cmp(&a.inbound_count));
        sorted.truncate(limit);
        sorted
    }
}
