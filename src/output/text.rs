//! Plain-text page dumps
//!
//! Each processed page is written as its URL, a blank line, the extracted
//! text and a dashed separator. In combined mode every page is appended to
//! `combined.txt`; in per-page mode each URL gets its own file.

use crate::config::TextMode;
use crate::output::traits::{OutputHandler, OutputResult};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File receiving every page in combined mode
pub const COMBINED_FILE: &str = "combined.txt";

const PAGE_SEPARATOR: &str = "----------";

/// Text sink writing into an output directory
pub struct TextFileOutput {
    directory: PathBuf,
    mode: TextMode,
}

impl TextFileOutput {
    /// Creates a text sink; the directory is created if missing
    pub fn new(directory: &Path, mode: TextMode) -> OutputResult<Self> {
        std::fs::create_dir_all(directory)?;
        Ok(Self {
            directory: directory.to_path_buf(),
            mode,
        })
    }

    /// Path of the file that receives the text of `url`
    pub fn path_for(&self, url: &str) -> PathBuf {
        match self.mode {
            TextMode::Combined => self.directory.join(COMBINED_FILE),
            TextMode::PerPage => self.directory.join(format!("{}.txt", sanitize_file_name(url))),
        }
    }
}

impl OutputHandler for TextFileOutput {
    fn record_text(&mut self, url: &str, text: &str) -> OutputResult<()> {
        let path = self.path_for(url);
        let mut file = open_append(&path)?;
        write!(file, "{}\n\n{}\n\n{}\n\n", url, text, PAGE_SEPARATOR)?;
        Ok(())
    }
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Maps a URL to a file name: everything outside `[A-Za-z0-9._-]` becomes `_`
pub fn sanitize_file_name(url: &str) -> String {
    url.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
