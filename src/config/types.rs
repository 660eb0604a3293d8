use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Boletin-Scraper
///
/// Every section and key is optional; missing values fall back to the
/// defaults for the national legislation portal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub dataset: DatasetConfig,
}

/// Scraper behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Site origin; listing hrefs are joined to it and stripped from record urls
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the advanced search listing endpoint
    #[serde(rename = "listing-path")]
    pub listing_path: String,

    /// Value of the `jurisdiccion` filter
    pub jurisdiction: String,

    /// Value of the `tipo_norma` filter
    #[serde(rename = "norm-type")]
    pub norm_type: String,

    /// Rows requested per listing page (`limit`)
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Total attempts for a fetch that keeps timing out
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Seconds to sleep between timed-out attempts
    #[serde(rename = "retry-sleep")]
    pub retry_sleep: u64,

    /// Maximum number of documents fetched concurrently
    #[serde(rename = "max-workers")]
    pub max_workers: u32,

    /// Whole-request timeout in seconds
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Connection timeout in seconds
    #[serde(rename = "connect-timeout")]
    pub connect_timeout: u64,
}

impl ScraperConfig {
    pub fn retry_sleep_duration(&self) -> Duration {
        Duration::from_secs(self.retry_sleep)
    }

    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.argentina.gob.ar".to_string(),
            listing_path: "/normativa/busqueda-avanzada".to_string(),
            jurisdiction: "nacional".to_string(),
            norm_type: "legislaciones".to_string(),
            page_size: 50,
            max_retries: 5,
            retry_sleep: 10,
            max_workers: 5,
            request_timeout: 30,
            connect_timeout: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "boletin-scraper".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: None,
        }
    }
}

/// Dataset location and rebuild origin
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the JSON lines dataset file
    pub path: String,

    /// First date scraped by a full rebuild
    #[serde(rename = "start-date")]
    pub start_date: NaiveDate,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "boletin-oficial-argentina.jsonl".to_string(),
            start_date: NaiveDate::from_ymd_opt(1893, 7, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}
