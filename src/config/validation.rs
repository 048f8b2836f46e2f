use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use std::fs::{self, OpenOptions};
use std::path::Path;
use url::Url;

const MAX_CONCURRENCY: usize = 32;
const PROBE_FILE: &str = ".site-survey-write-probe";

/// Validates the entire configuration
///
/// The output directory is created when missing, so a successful validation
/// guarantees every sink can be opened before the first fetch.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let seed = match config.seed_url.as_deref().map(str::trim) {
        Some(seed) if !seed.is_empty() => seed,
        _ => {
            return Err(ConfigError::Validation(
                "a seed URL is required".to_string(),
            ))
        }
    };

    // Non-https seeds are accepted here; the crawl filters them out itself
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    if config.max_pages == 0 {
        return Err(ConfigError::Validation(
            "max_pages must be a positive number".to_string(),
        ));
    }

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.accepted_scheme.is_empty() {
        return Err(ConfigError::Validation(
            "accepted_scheme cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if matches!(&config.database_path, Some(p) if p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    ensure_writable(Path::new(&config.directory))
}

/// Creates the directory if needed and proves a file can be written inside it
fn ensure_writable(dir: &Path) -> Result<(), ConfigError> {
    let unwritable = |e: std::io::Error| ConfigError::Unwritable(format!("{}: {}", dir.display(), e));

    fs::create_dir_all(dir).map_err(unwritable)?;

    let probe = dir.join(PROBE_FILE);
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&probe)
        .map_err(unwritable)?;
    fs::remove_file(&probe).map_err(unwritable)?;

    Ok(())
}
