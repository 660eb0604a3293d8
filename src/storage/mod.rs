//! Storage module for persisting the dataset
//!
//! This module handles the newline-delimited JSON dataset, including:
//! - The persisted `DocumentRecord` shape
//! - Appending one date's batch at a time
//! - Finding the resume date from the last stored record
//! - Driving the day-by-day update and full rebuild loops

mod jsonl;
mod traits;

pub use jsonl::{DatasetStore, RunSummary};
pub use traits::{DailyHarvest, StorageError, StorageResult};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One document as stored in the dataset, one JSON object per line
///
/// `date` serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub title: String,
    pub name: String,
    pub entity: String,
    pub summary: String,

    /// Text of the full-text page, or `summary` when the document has none
    pub full_text: String,

    /// Hrefs inside the full-text article, duplicates kept, in page order
    pub url_in_articles: Vec<String>,

    /// Publication date the record was scraped for
    pub date: NaiveDate,

    /// Document path with the site origin stripped
    pub url: String,
}
