//! Storage traits and error types
//!
//! This module defines the seam between the dataset store and whatever
//! produces a day's records, and the store's error type.

use chrono::NaiveDate;
use std::future::Future;
use thiserror::Error;

use crate::storage::DocumentRecord;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Source of the records published on a given date
///
/// The store calls this once per date, in increasing date order, and appends
/// whatever comes back before asking for the next date. An empty batch means
/// the date had no data; it is not an error.
pub trait DailyHarvest {
    fn harvest_date(&self, date: NaiveDate) -> impl Future<Output = Vec<DocumentRecord>> + Send;
}
