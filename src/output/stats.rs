//! Statistics generation from the dataset
//!
//! This module provides functionality for extracting and displaying
//! statistics about a JSON lines dataset.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::storage::{DocumentRecord, StorageError};
use crate::ScraperError;

/// Dataset statistics summary
#[derive(Debug, Clone, Default)]
pub struct DatasetStatistics {
    /// Total number of parsable records
    pub total_records: u64,

    /// Count of records per publication date
    pub records_by_date: BTreeMap<NaiveDate, u64>,

    /// Records whose full-text article carried outgoing links
    pub records_with_article_links: u64,

    /// Records with a non-empty summary copied as their full text
    pub records_with_summary_as_full_text: u64,

    /// Records whose full text is empty
    pub records_with_empty_full_text: u64,

    /// Non-blank lines that did not parse as a record
    pub malformed_lines: u64,
}

impl DatasetStatistics {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records_by_date.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records_by_date.keys().next_back().copied()
    }

    pub fn days_covered(&self) -> usize {
        self.records_by_date.len()
    }

    fn add(&mut self, record: &DocumentRecord) {
        self.total_records += 1;
        *self.records_by_date.entry(record.date).or_insert(0) += 1;

        if !record.url_in_articles.is_empty() {
            self.records_with_article_links += 1;
        }
        if record.full_text.is_empty() {
            self.records_with_empty_full_text += 1;
        } else if record.full_text == record.summary {
            self.records_with_summary_as_full_text += 1;
        }
    }
}

/// Loads statistics from a dataset file
///
/// # Returns
///
/// * `Ok(DatasetStatistics)` - Successfully scanned the dataset
/// * `Err(ScraperError)` - The file could not be opened or read
pub fn load_statistics(path: &Path) -> Result<DatasetStatistics, ScraperError> {
    let file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    let mut stats = DatasetStatistics::default();

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| StorageError::io(path, e))?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<DocumentRecord>(&line) {
            Ok(record) => stats.add(&record),
            Err(e) => {
                tracing::debug!("Malformed line in {}: {}", path.display(), e);
                stats.malformed_lines += 1;
            }
        }
    }

    Ok(stats)
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Total records: {}", stats.total_records);
    println!("Days with data: {}", stats.days_covered());

    match (stats.first_date(), stats.last_date()) {
        (Some(first), Some(last)) => println!("Date range: {} .. {}", first, last),
        _ => println!("Date range: (empty)"),
    }

    println!(
        "Records with links in article: {}",
        stats.records_with_article_links
    );
    println!(
        "Records with the summary as full text: {}",
        stats.records_with_summary_as_full_text
    );
    println!(
        "Records with empty full text: {}",
        stats.records_with_empty_full_text
    );

    if stats.malformed_lines > 0 {
        println!("\nMalformed lines: {}", stats.malformed_lines);
    }

    if !stats.records_by_date.is_empty() {
        println!("\nLatest days:");
        for (date, count) in stats.records_by_date.iter().rev().take(7) {
            println!("  {}: {}", date, count);
        }
    }
}
