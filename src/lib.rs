//! Boletin-Scraper: incremental harvester for the national legal bulletin
//!
//! This crate walks the search listing of the public legislation portal day by
//! day, fetches every document published on each date, and appends the results
//! to a newline-delimited JSON dataset that can be resumed from its last date.

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for Boletin-Scraper operations
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Boletin-Scraper operations
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{DocumentReference, Harvester};
pub use storage::{DatasetStore, DocumentRecord};
