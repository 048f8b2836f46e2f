use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for Site-Survey
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Returns the SQLite export path, resolved against the output directory
    pub fn database_file(&self) -> Option<PathBuf> {
        self.output.database_path.as_ref().map(|p| {
            let path = PathBuf::from(p);
            if path.is_absolute() {
                path
            } else {
                PathBuf::from(&self.output.directory).join(path)
            }
        })
    }

    /// Returns true if page metadata records are needed by any sink
    pub fn wants_page_records(&self) -> bool {
        self.output.tabular || self.output.database_path.is_some()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// URL the traversal starts from
    #[serde(rename = "seed-url", default)]
    pub seed_url: Option<String>,

    /// Page budget for the primary traversal
    #[serde(rename = "max-pages", default)]
    pub max_pages: usize,

    /// Only URLs with this scheme enter the frontier
    #[serde(rename = "accepted-scheme", default = "default_scheme")]
    pub accepted_scheme: String,

    /// Maximum number of concurrent page fetches
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            seed_url: None,
            max_pages: 0,
            accepted_scheme: default_scheme(),
            concurrency: default_concurrency(),
            request_timeout_secs: default_timeout(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
        }
    }
}

/// How extracted page text is laid out on disk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextMode {
    /// Every page appended to `combined.txt`
    #[default]
    Combined,
    /// One file per page URL
    PerPage,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving every output file
    #[serde(default = "default_directory")]
    pub directory: String,

    /// Text sink layout
    #[serde(rename = "text-mode", default)]
    pub text_mode: TextMode,

    /// Write `data.csv` and `internal_link_data.csv`
    #[serde(default)]
    pub tabular: bool,

    /// Optional SQLite export
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// Write `summary.md`
    #[serde(default = "default_true")]
    pub summary: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            text_mode: TextMode::default(),
            tabular: false,
            database_path: None,
            summary: true,
        }
    }
}

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed_url: Option<String>,
    pub max_pages: Option<usize>,
    pub directory: Option<String>,
    pub per_page: bool,
    pub tabular: bool,
    pub database_path: Option<String>,
    pub concurrency: Option<usize>,
}

impl Overrides {
    /// Applies the overrides on top of `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(seed) = &self.seed_url {
            config.crawler.seed_url = Some(seed.clone());
        }
        if let Some(max_pages) = self.max_pages {
            config.crawler.max_pages = max_pages;
        }
        if let Some(directory) = &self.directory {
            config.output.directory = directory.clone();
        }
        if self.per_page {
            config.output.text_mode = TextMode::PerPage;
        }
        if self.tabular {
            config.output.tabular = true;
        }
        if let Some(db) = &self.database_path {
            config.output.database_path = Some(db.clone());
        }
        if let Some(concurrency) = self.concurrency {
            config.crawler.concurrency = concurrency;
        }
    }
}

fn default_scheme() -> String {
    "https".to_string()
}

fn default_concurrency() -> usize {
    1
}

fn default_timeout() -> u64 {
    30
}

fn default_crawler_name() -> String {
    "site-survey".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_directory() -> String {
    "survey-output".to_string()
}

fn default_true() -> bool {
    true
}
