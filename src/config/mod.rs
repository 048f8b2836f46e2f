//! Configuration module for Site-Survey
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and merging them with command-line overrides.
//!
//! # Example
//!
//! ```no_run
//! use site_survey::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("survey.toml")).unwrap();
//! println!("Crawler will visit at most {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, Overrides, TextMode, UserAgentConfig};

// Re-export parser functions
pub use parser::{load_config, read_config, resolve_config};
pub use validation::validate;
