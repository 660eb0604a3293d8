//! Document extraction
//!
//! Turns a listing reference into a `DocumentRecord` by fetching its detail
//! page and, when the page links to one, its full-text page.

use url::Url;

use crate::config::ScraperConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{canonical_path, parse_document_page, parse_full_text, resolve_link};
use crate::crawler::DocumentReference;
use crate::storage::DocumentRecord;
use crate::ScraperError;

/// Fetches and assembles one document
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    fetcher: Fetcher,
    base_url: Url,
}

impl DocumentExtractor {
    pub fn new(fetcher: Fetcher, config: &ScraperConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            fetcher,
            base_url: Url::parse(&config.base_url)?,
        })
    }

    /// Extracts the record for `reference`
    ///
    /// Returns None only when the detail page itself cannot be fetched. A
    /// failed full-text fetch leaves `full_text` and `url_in_articles` empty.
    pub async fn extract_document(&self, reference: &DocumentReference) -> Option<DocumentRecord> {
        let page = match self.fetcher.fetch(&reference.url, &[]).await {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Skipping document {}: {}", reference.url, e);
                return None;
            }
        };

        let detail = parse_document_page(&page.body);

        let full_text_url = detail
            .full_text_href
            .as_deref()
            .and_then(|href| resolve_link(href, &self.base_url));

        let (full_text, url_in_articles) = match full_text_url {
            Some(url) => match self.fetcher.fetch(&url, &[]).await {
                Ok(full_page) => {
                    let article = parse_full_text(&full_page.body);
                    (article.text, article.links)
                }
                Err(e) => {
                    tracing::warn!(
                        "No full text for {} ({}): {}",
                        reference.url,
                        url,
                        e
                    );
                    (String::new(), Vec::new())
                }
            },
            None => (detail.summary.clone(), Vec::new()),
        };

        Some(DocumentRecord {
            title: detail.title,
            name: detail.name,
            entity: detail.entity,
            summary: detail.summary,
            full_text,
            url_in_articles,
            date: reference.date,
            url: canonical_path(&reference.url, &self.base_url),
        })
    }
}
