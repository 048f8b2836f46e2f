//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a survey run,
//! including run statistics, the most linked pages, sitemap-only pages and
//! orphan pages.

use crate::crawler::CrawlReport;
use crate::output::traits::{CrawlSummary, OutputHandler, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Summary file name inside the output directory
pub const SUMMARY_FILE: &str = "summary.md";

/// Generates a markdown summary file
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Site Survey Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed URL**: {}\n", summary.seed_url));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    md.push_str(&format!("- **Finished**: {}\n", summary.finished_at));
    md.push_str(&format!(
        "- **Duration**: {} seconds ({:.2} minutes)\n",
        summary.duration_seconds,
        summary.duration_seconds as f64 / 60.0
    ));
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Visited**: {}\n", summary.pages_visited));
    md.push_str(&format!(
        "- **Reached by Links**: {}\n",
        summary.primary_visited
    ));
    md.push_str(&format!(
        "- **Sitemap Only**: {}\n",
        summary.sitemap_only.len()
    ));
    md.push_str(&format!(
        "- **Linked Destinations**: {}\n",
        summary.link_destinations
    ));
    md.push_str(&format!("- **Internal Links**: {}\n", summary.total_edges));
    md.push_str(&format!("- **Failed Fetches**: {}\n", summary.failures.len()));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    if !summary.top_linked.is_empty() {
        md.push_str(&format!(
            "## Top {} Pages by Inbound Links\n\n",
            summary.top_linked.len()
        ));
        md.push_str("| URL | Inbound Links |\n");
        md.push_str("|-----|---------------|\n");

        for (url, count) in &summary.top_linked {
            md.push_str(&format!("| {} | {} |\n", url, count));
        }
        md.push('\n');
    }

    if !summary.sitemap_only.is_empty() {
        md.push_str("## Pages Found Only in Sitemap\n\n");
        for url in &summary.sitemap_only {
            md.push_str(&format!("- {}\n", url));
        }
        md.push('\n');
    }

    if !summary.orphan_pages.is_empty() {
        md.push_str("## Orphan Pages\n\n");
        md.push_str("Visited pages that no counted link points to.\n\n");
        for url in &summary.orphan_pages {
            md.push_str(&format!("- {}\n", url));
        }
        md.push('\n');
    }

    if !summary.failures.is_empty() {
        md.push_str("## Failed Fetches\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");

        for (url, message) in &summary.failures {
            md.push_str(&format!("| {} | {} |\n", url, message.replace('|', "\\|")));
        }
        md.push('\n');
    }

    md
}

/// Output handler writing `summary.md` when the run finishes
pub struct MarkdownSummaryOutput {
    path: PathBuf,
    config_hash: String,
}

impl MarkdownSummaryOutput {
    pub fn new(directory: &Path, config_hash: &str) -> Self {
        Self {
            path: directory.join(SUMMARY_FILE),
            config_hash: config_hash.to_string(),
        }
    }
}

impl OutputHandler for MarkdownSummaryOutput {
    fn finalize(&mut self, report: &CrawlReport) -> OutputResult<()> {
        let summary = CrawlSummary::from_report(report, &self.config_hash);
        generate_markdown_summary(&summary, &self.path)?;
        tracing::info!("Summary written to {}", self.path.display());
        Ok(())
    }
}
