//! JSON lines dataset storage
//!
//! Resume detection, batch appends and the per-date loop behind `update` and
//! `create`.

use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::storage::traits::{DailyHarvest, StorageError, StorageResult};
use crate::storage::DocumentRecord;

/// Append-only JSON lines dataset
///
/// The file is only ever extended one whole date at a time, in increasing
/// date order, so its last line always belongs to the last fully harvested
/// date.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    path: PathBuf,
}

/// What an update or rebuild did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Dates harvested, with or without data
    pub dates_processed: u32,

    /// Dates that produced no records
    pub dates_without_data: u32,

    /// Lines appended to the dataset
    pub records_written: usize,

    /// First date harvested, if any
    pub first_date: Option<NaiveDate>,

    /// Last date harvested, if any
    pub last_date: Option<NaiveDate>,
}

/// Only the field needed to resume
#[derive(Deserialize)]
struct DateOnly {
    date: NaiveDate,
}

impl DatasetStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Date of the last stored record
    ///
    /// Returns None when the file is missing, unreadable or empty, or when its
    /// last non-blank line is not a JSON object with a `YYYY-MM-DD` date.
    pub fn last_date(&self) -> Option<NaiveDate> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("Error reading {}: {}", self.path.display(), e);
                return None;
            }
        };

        let mut last_line = None;
        for line in BufReader::new(file).lines() {
            match line {
                Ok(line) if !line.trim().is_empty() => last_line = Some(line),
                Ok(_) => {}
                Err(e) => {
                    tracing::error!("Error reading {}: {}", self.path.display(), e);
                    return None;
                }
            }
        }

        let Some(last_line) = last_line else {
            tracing::error!("Error reading {}: dataset is empty", self.path.display());
            return None;
        };

        match serde_json::from_str::<DateOnly>(&last_line) {
            Ok(record) => Some(record.date),
            Err(e) => {
                tracing::error!("Error reading {}: last line: {}", self.path.display(), e);
                None
            }
        }
    }

    /// Date the next update resumes after: the last stored date, or yesterday
    pub fn resume_date(&self, today: NaiveDate) -> NaiveDate {
        self.last_date()
            .unwrap_or_else(|| today.pred_opt().unwrap_or(today))
    }

    /// Appends a batch, one JSON object per line, with a single write
    ///
    /// A last line left without its newline is terminated first, so the batch
    /// always starts on a line of its own.
    pub fn append_batch(&self, records: &[DocumentRecord]) -> StorageResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StorageError::io(&self.path, e))?;

        let mut buffer = String::new();
        if !ends_with_newline(&mut file).map_err(|e| StorageError::io(&self.path, e))? {
            tracing::warn!("{} has an unterminated last line", self.path.display());
            buffer.push('\n');
        }
        for record in records {
            buffer.push_str(&serde_json::to_string(record)?);
            buffer.push('\n');
        }

        write_and_sync(&mut file, buffer.as_bytes())
            .map_err(|e| StorageError::io(&self.path, e))?;

        Ok(())
    }

    /// Empties the dataset, creating it if needed
    pub fn truncate(&self) -> StorageResult<()> {
        File::create(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        Ok(())
    }

    /// Harvests every date after the resume date through `today`
    pub async fn update<H: DailyHarvest>(
        &self,
        harvester: &H,
        today: NaiveDate,
    ) -> StorageResult<RunSummary> {
        let last_date = self.resume_date(today);
        tracing::info!("Resuming {} after {}", self.path.display(), last_date);

        let summary = match last_date.succ_opt() {
            Some(next_date) => self.harvest_range(harvester, next_date, today).await?,
            None => RunSummary::default(),
        };

        tracing::info!("Update complete.");
        Ok(summary)
    }

    /// Rebuilds the dataset from `start_date` through `today`
    pub async fn create<H: DailyHarvest>(
        &self,
        harvester: &H,
        start_date: NaiveDate,
        today: NaiveDate,
    ) -> StorageResult<RunSummary> {
        self.truncate()?;
        tracing::info!("Rebuilding {} from {}", self.path.display(), start_date);

        let summary = self.harvest_range(harvester, start_date, today).await?;

        tracing::info!("Dataset creation complete.");
        Ok(summary)
    }

    /// The date loop shared by update and create
    async fn harvest_range<H: DailyHarvest>(
        &self,
        harvester: &H,
        from: NaiveDate,
        to: NaiveDate,
    ) -> StorageResult<RunSummary> {
        let mut summary = RunSummary::default();
        let mut date = from;

        while date <= to {
            tracing::info!("Scraping data for {}", date);
            let records = harvester.harvest_date(date).await;

            if records.is_empty() {
                tracing::warn!("No data found for {}", date);
                summary.dates_without_data += 1;
            } else {
                self.append_batch(&records)?;
                summary.records_written += records.len();
            }

            summary.dates_processed += 1;
            summary.first_date.get_or_insert(date);
            summary.last_date = Some(date);

            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        Ok(summary)
    }
}

/// True for an empty file or one whose last byte is `\n`
fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(true);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

fn write_and_sync(file: &mut File, bytes: &[u8]) -> std::io::Result<()> {
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_data()
}
