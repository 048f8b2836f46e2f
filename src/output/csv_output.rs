//! CSV export of page metadata and link statistics
//!
//! - `data.csv` gets one row per processed page; the header is only written
//!   when the file is new, so repeated runs into one directory accumulate rows
//! - `internal_link_data.csv` is rewritten at the end of every run

use crate::crawler::PageRecord;
use crate::graph::{LinkRow, JOIN_DELIMITER};
use crate::output::traits::{OutputHandler, OutputResult};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Page metadata file name
pub const PAGE_FILE: &str = "data.csv";

/// Link statistics file name
pub const LINK_FILE: &str = "internal_link_data.csv";

const PAGE_HEADER: [&str; 8] = [
    "URL",
    "Title",
    "Description",
    "H1",
    "H2",
    "Canonical",
    "Is Canonical Same as URL",
    "Indexed from Sitemap",
];

const LINK_HEADER: [&str; 4] = ["URL", "Inbound Links Count", "Source URLs", "Anchor Texts"];

/// Tabular sink writing both CSV files
pub struct CsvOutput {
    pages: csv::Writer<File>,
    link_path: PathBuf,
}

impl CsvOutput {
    /// Opens `data.csv` for appending inside `directory`
    pub fn new(directory: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(directory)?;
        let page_path = directory.join(PAGE_FILE);

        let is_new = std::fs::metadata(&page_path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&page_path)?;
        let mut pages = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            pages.write_record(PAGE_HEADER)?;
            pages.flush()?;
        }

        Ok(Self {
            pages,
            link_path: directory.join(LINK_FILE),
        })
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

impl OutputHandler for CsvOutput {
    fn record_page(&mut self, page: &PageRecord) -> OutputResult<()> {
        let h1 = page.h1_excerpts.join(JOIN_DELIMITER);
        let h2 = page.h2_excerpts.join(JOIN_DELIMITER);

        self.pages.write_record([
            page.url.as_str(),
            page.title.as_str(),
            page.description.as_str(),
            h1.as_str(),
            h2.as_str(),
            page.canonical_url.as_str(),
            yes_no(page.canonical_matches_url),
            yes_no(page.from_sitemap_only),
        ])?;
        self.pages.flush()?;
        Ok(())
    }

    fn record_links(&mut self, rows: &[LinkRow]) -> OutputResult<()> {
        let mut writer = csv::Writer::from_path(&self.link_path)?;
        writer.write_record(LINK_HEADER)?;

        for row in rows {
            let count = row.inbound_count.to_string();
            writer.write_record([
                row.url.as_str(),
                count.as_str(),
                row.source_urls.as_str(),
                row.anchor_texts.as_str(),
            ])?;
        }

        writer.flush()?;
        tracing::info!("Wrote {} link rows to {}", rows.len(), self.link_path.display());
        Ok(())
    }
}
