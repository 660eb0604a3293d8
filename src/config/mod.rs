//! Configuration module for Boletin-Scraper
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! A missing section or key takes its default, so an empty file is a valid
//! configuration.
//!
//! # Example
//!
//! ```no_run
//! use boletin_scraper::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("boletin.toml")).unwrap();
//! println!("Fetching with {} workers", config.scraper.max_workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, DatasetConfig, ScraperConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
