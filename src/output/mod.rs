//! Output module for survey results
//!
//! This module handles:
//! - The [`OutputHandler`] contract the crawl engine writes through
//! - Plain-text page dumps, CSV exports and the SQLite export
//! - The markdown run summary and `--stats` reporting

mod csv_output;
mod markdown;
mod sqlite_output;
pub mod stats;
mod text;
mod traits;

pub use csv_output::{CsvOutput, LINK_FILE, PAGE_FILE};
pub use markdown::{
    format_markdown_summary, generate_markdown_summary, MarkdownSummaryOutput, SUMMARY_FILE,
};
pub use sqlite_output::SqliteOutputHandler;
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use text::{sanitize_file_name, TextFileOutput, COMBINED_FILE};
pub use traits::{CrawlSummary, OutputError, OutputHandler, OutputResult};

use crate::config::Config;
use crate::crawler::{CrawlReport, PageRecord};
use crate::graph::LinkRow;
use crate::storage::SqliteStorage;
use crate::SurveyError;
use std::path::PathBuf;

/// Fans every call out to a list of handlers, in order
///
/// The first failing handler aborts the call, except for `finalize`.
#[derive(Default)]
pub struct Outputs {
    handlers: Vec<Box<dyn OutputHandler>>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handler
    pub fn push<H: OutputHandler + 'static>(&mut self, handler: H) {
        self.handlers.push(Box::new(handler));
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl OutputHandler for Outputs {
    fn record_text(&mut self, url: &str, text: &str) -> OutputResult<()> {
        for handler in &mut self.handlers {
            handler.record_text(url, text)?;
        }
        Ok(())
    }

    fn record_page(&mut self, page: &PageRecord) -> OutputResult<()> {
        for handler in &mut self.handlers {
            handler.record_page(page)?;
        }
        Ok(())
    }

    fn record_links(&mut self, rows: &[LinkRow]) -> OutputResult<()> {
        for handler in &mut self.handlers {
            handler.record_links(rows)?;
        }
        Ok(())
    }

    /// Every handler is finalized even if an earlier one fails; the first error is returned
    fn finalize(&mut self, report: &CrawlReport) -> OutputResult<()> {
        let mut first_error = None;
        for handler in &mut self.handlers {
            if let Err(e) = handler.finalize(report) {
                tracing::error!("Output handler failed to finalize: {}", e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Builds every sink enabled by the configuration
///
/// The text sink is always present. CSV, SQLite and summary sinks follow the
/// `[output]` table.
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash recorded with the SQLite run and in the summary
///
/// # Returns
///
/// * `Ok(Outputs)` - All sinks opened
/// * `Err(SurveyError)` - A sink could not be opened
pub fn build_outputs(config: &Config, config_hash: &str) -> Result<Outputs, SurveyError> {
    let directory = PathBuf::from(&config.output.directory);
    let mut outputs = Outputs::new();

    outputs.push(TextFileOutput::new(&directory, config.output.text_mode)?);

    if config.output.tabular {
        outputs.push(CsvOutput::new(&directory)?);
    }

    if let Some(path) = config.database_file() {
        tracing::info!("Exporting to database {}", path.display());
        let storage = SqliteStorage::new(&path)?;
        let seed_url = config.crawler.seed_url.as_deref().unwrap_or_default();
        outputs.push(SqliteOutputHandler::start(storage, seed_url, config_hash)?);
    }

    if config.output.summary {
        outputs.push(MarkdownSummaryOutput::new(&directory, config_hash));
    }

    Ok(outputs)
}
