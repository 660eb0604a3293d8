//! Listing pagination
//!
//! Walks the advanced-search results for a single publication date, one page
//! at a time, until a page comes back empty or the request fails.

use chrono::NaiveDate;
use url::Url;

use crate::config::ScraperConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::parse_listing;
use crate::crawler::DocumentReference;
use crate::ScraperError;

/// Pages through the search listing for a date
#[derive(Debug, Clone)]
pub struct PageWalker {
    fetcher: Fetcher,
    base_url: Url,
    listing_url: String,
    jurisdiction: String,
    norm_type: String,
    page_size: u32,
}

impl PageWalker {
    /// Creates a walker for the listing endpoint described by `config`
    pub fn new(fetcher: Fetcher, config: &ScraperConfig) -> Result<Self, ScraperError> {
        let base_url = Url::parse(&config.base_url)?;
        let listing_url = base_url.join(&config.listing_path)?.to_string();

        Ok(Self {
            fetcher,
            base_url,
            listing_url,
            jurisdiction: config.jurisdiction.clone(),
            norm_type: config.norm_type.clone(),
            page_size: config.page_size,
        })
    }

    /// Query parameters for one listing page
    fn query(&self, date: NaiveDate, offset: u32) -> Vec<(&'static str, String)> {
        let day = date.format("%Y-%m-%d").to_string();
        vec![
            ("jurisdiccion", self.jurisdiction.clone()),
            ("tipo_norma", self.norm_type.clone()),
            ("publicacion_desde", day.clone()),
            ("publicacion_hasta", day),
            ("limit", self.page_size.to_string()),
            ("offset", offset.to_string()),
        ]
    }

    /// Lists every document published on `date`
    ///
    /// The offset starts at 1 and grows by one per page. A failed request ends
    /// the walk early and keeps whatever was accumulated; a page without rows
    /// ends it normally.
    pub async fn list_documents_for_date(&self, date: NaiveDate) -> Vec<DocumentReference> {
        let mut references = Vec::new();
        let mut offset = 1u32;

        loop {
            let params = self.query(date, offset);
            let page = match self.fetcher.fetch(&self.listing_url, &params).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        "Stopping listing for {} at page {}: {}",
                        date,
                        offset,
                        e
                    );
                    break;
                }
            };

            let listing = parse_listing(&page.body, &self.base_url, date);
            if listing.row_count == 0 {
                tracing::debug!("Listing for {} ended after {} pages", date, offset - 1);
                break;
            }

            let skipped = listing.row_count - listing.references.len();
            if skipped > 0 {
                tracing::debug!(
                    "Skipped {} malformed rows on page {} for {}",
                    skipped,
                    offset,
                    date
                );
            }

            references.extend(listing.references);
            offset += 1;
        }

        tracing::info!("Found {} documents for {}", references.len(), date);
        references
    }
}
