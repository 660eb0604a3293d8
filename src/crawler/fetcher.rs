//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with optional query parameters
//! - Retry logic for timeouts
//! - Error classification

use crate::config::{ScraperConfig, UserAgentConfig};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Failure of a fetch operation
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt timed out
    #[error("Request to {url} timed out after {attempts} attempts")]
    Timeout { url: String, attempts: u32 },

    /// Connection, TLS, body decoding or any other request-level failure
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// The server answered with something other than 200
    #[error("HTTP {status_code} for {url}")]
    Http { url: String, status_code: u16 },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// A page fetched with a 200 response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// How many times a timed-out request is attempted and how long to wait between
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_retries: u32,
    /// Pause between a timed-out attempt and the next one
    pub retry_sleep: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_sleep: Duration::from_secs(10),
        }
    }
}

impl From<&ScraperConfig> for RetryPolicy {
    fn from(config: &ScraperConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_sleep: config.retry_sleep_duration(),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `request_timeout` - Timeout for a whole request, body included
/// * `connect_timeout` - Timeout for establishing the connection
///
/// # Example
///
/// ```no_run
/// use boletin_scraper::config::UserAgentConfig;
/// use boletin_scraper::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(
///     &UserAgentConfig::default(),
///     Duration::from_secs(30),
///     Duration::from_secs(10),
/// )
/// .unwrap();
/// ```
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    request_timeout: Duration,
    connect_timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(format_user_agent(user_agent))
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Format: CrawlerName/Version (+ContactURL)
pub fn format_user_agent(config: &UserAgentConfig) -> String {
    match &config.contact_url {
        Some(contact) => format!(
            "{}/{} (+{})",
            config.crawler_name, config.crawler_version, contact
        ),
        None => format!("{}/{}", config.crawler_name, config.crawler_version),
    }
}

/// Performs GET requests with the timeout retry policy
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Timeout | Retry up to `max_retries` attempts, `retry_sleep` between |
/// | Any other request error | Immediate → `FetchError::Network` |
/// | Status other than 200 | Immediate → `FetchError::Http` |
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        Self { client, policy }
    }

    /// Fetches `url` with the given query parameters
    pub async fn fetch(&self, url: &str, params: &[(&str, String)]) -> Result<FetchedPage, FetchError> {
        let max_retries = self.policy.max_retries;

        for attempt in 1..=max_retries {
            tracing::info!("Fetching {} (attempt {}/{})", url, attempt, max_retries);

            match self.fetch_once(url, params).await {
                Err(e) if e.is_timeout() => {
                    tracing::warn!(
                        "Timeout fetching {} (attempt {}/{})",
                        url,
                        attempt,
                        max_retries
                    );
                    if attempt < max_retries {
                        tokio::time::sleep(self.policy.retry_sleep).await;
                    }
                }
                other => return other,
            }
        }

        tracing::error!("Giving up on {} after {} timed out attempts", url, max_retries);
        Err(FetchError::Timeout {
            url: url.to_string(),
            attempts: max_retries,
        })
    }

    /// One GET request, no retries
    async fn fetch_once(&self, url: &str, params: &[(&str, String)]) -> Result<FetchedPage, FetchError> {
        let mut request = self.client.get(url);
        if !params.is_empty() {
            request = request.query(params);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!("HTTP {} for {}", status.as_u16(), url);
            return Err(FetchError::Http {
                url: url.to_string(),
                status_code: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchedPage {
            status_code: status.as_u16(),
            body,
        })
    }
}

/// Maps a reqwest error onto the fetch taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            attempts: 1,
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: format!("Connection failed: {}", error),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
