//! Crawler module for the legislation portal
//!
//! This module contains the scraping logic, including:
//! - HTTP fetching with timeout retries
//! - HTML parsing of listing, detail and full-text pages
//! - Pagination of the per-date search listing
//! - Concurrent document extraction

mod extractor;
mod fetcher;
mod harvester;
mod listing;
mod parser;

pub use extractor::DocumentExtractor;
pub use fetcher::{build_http_client, format_user_agent, FetchError, FetchedPage, Fetcher, RetryPolicy};
pub use harvester::Harvester;
pub use listing::PageWalker;
pub use parser::{
    canonical_path, choose_full_text_link, parse_document_page, parse_full_text, parse_listing,
    resolve_link, DocumentPage, FullTextPage, ListingPage,
};

use chrono::{Local, NaiveDate};

use crate::config::Config;
use crate::storage::{DailyHarvest, DatasetStore, DocumentRecord, RunSummary};
use crate::ScraperError;

/// A document found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReference {
    /// Absolute URL of the document's detail page
    pub url: String,

    /// Publication date the listing was queried for
    pub date: NaiveDate,

    /// Short label from the listing row
    pub description: String,
}

/// Brings the configured dataset up to today
///
/// This is the main entry point for a scheduled run. It resumes from the last
/// date stored in the dataset, or from yesterday when the dataset has no
/// readable last record.
pub async fn update(config: &Config) -> Result<RunSummary, ScraperError> {
    let harvester = Harvester::from_config(config)?;
    let store = DatasetStore::new(&config.dataset.path);
    let summary = store.update(&harvester, today()).await?;
    Ok(summary)
}

/// Rebuilds the configured dataset from `dataset.start-date` up to today
pub async fn create(config: &Config) -> Result<RunSummary, ScraperError> {
    let harvester = Harvester::from_config(config)?;
    let store = DatasetStore::new(&config.dataset.path);
    let summary = store
        .create(&harvester, config.dataset.start_date, today())
        .await?;
    Ok(summary)
}

/// Harvests a single date without touching the dataset
pub async fn scrape_date(config: &Config, date: NaiveDate) -> Result<Vec<DocumentRecord>, ScraperError> {
    let harvester = Harvester::from_config(config)?;
    Ok(harvester.harvest_date(date).await)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
