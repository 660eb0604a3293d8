//! Concurrent harvesting
//!
//! Fans the references of one date out over a bounded set of tasks and
//! gathers the records in completion order.

use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::Config;
use crate::crawler::extractor::DocumentExtractor;
use crate::crawler::fetcher::{build_http_client, Fetcher, RetryPolicy};
use crate::crawler::listing::PageWalker;
use crate::crawler::DocumentReference;
use crate::storage::{DailyHarvest, DocumentRecord};
use crate::ScraperError;

/// Lists a date's documents and extracts them with bounded concurrency
#[derive(Debug, Clone)]
pub struct Harvester {
    walker: PageWalker,
    extractor: Arc<DocumentExtractor>,
    max_workers: usize,
}

impl Harvester {
    pub fn new(walker: PageWalker, extractor: DocumentExtractor, max_workers: usize) -> Self {
        Self {
            walker,
            extractor: Arc::new(extractor),
            max_workers: max_workers.max(1),
        }
    }

    /// Builds the HTTP client, fetcher, walker and extractor from `config`
    pub fn from_config(config: &Config) -> Result<Self, ScraperError> {
        let client = build_http_client(
            &config.user_agent,
            config.scraper.request_timeout_duration(),
            config.scraper.connect_timeout_duration(),
        )?;
        let fetcher = Fetcher::new(client, RetryPolicy::from(&config.scraper));

        let walker = PageWalker::new(fetcher.clone(), &config.scraper)?;
        let extractor = DocumentExtractor::new(fetcher, &config.scraper)?;

        Ok(Self::new(walker, extractor, config.scraper.max_workers as usize))
    }

    /// Extracts every reference, at most `max_workers` at a time
    ///
    /// Records come back in completion order. Failed extractions are dropped;
    /// only their count is logged.
    pub async fn harvest(&self, references: Vec<DocumentReference>) -> Vec<DocumentRecord> {
        let total = references.len();
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut join_set = JoinSet::new();

        for reference in references {
            let extractor = Arc::clone(&self.extractor);
            let semaphore = Arc::clone(&semaphore);
            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                extractor.extract_document(&reference).await
            });
        }

        let mut records = Vec::with_capacity(total);
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => tracing::error!("Extraction task failed: {}", e),
            }
        }

        if records.len() < total {
            tracing::warn!(
                "Extracted {}/{} documents ({} skipped)",
                records.len(),
                total,
                total - records.len()
            );
        } else {
            tracing::info!("Extracted {}/{} documents", records.len(), total);
        }

        records
    }
}

impl DailyHarvest for Harvester {
    async fn harvest_date(&self, date: NaiveDate) -> Vec<DocumentRecord> {
        let references = self.walker.list_documents_for_date(date).await;
        if references.is_empty() {
            return Vec::new();
        }
        self.harvest(references).await
    }
}
