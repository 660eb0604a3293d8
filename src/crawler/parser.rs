//! HTML parser for the legislation portal pages
//!
//! This module handles parsing the three kinds of pages the scraper reads:
//! - Listing pages (one result row per document)
//! - Document detail pages (metadata, summary and the link to the full text)
//! - Full-text pages (the article body and its outgoing links)
//!
//! An absent element is never an error: the corresponding field is empty.

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::crawler::DocumentReference;

/// Result rows found on one listing page
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Number of `tr.panel` rows, well-formed or not
    pub row_count: usize,

    /// References extracted from the well-formed rows
    pub references: Vec<DocumentReference>,
}

/// Fields read from a document detail page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPage {
    /// Issuing entity, from the lead byline
    pub entity: String,

    /// Secondary heading
    pub title: String,

    /// Primary heading
    pub name: String,

    /// Text of the page's own article body
    pub summary: String,

    /// Raw href of the preferred full-text link, if any
    pub full_text_href: Option<String>,
}

/// Article body of a full-text page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FullTextPage {
    /// Text of the article
    pub text: String,

    /// Raw hrefs inside the article, in document order
    pub links: Vec<String>,
}

/// Parses a listing page into document references
///
/// A row yields a reference only when it has both a `td.numero` cell holding
/// an `<a href>` and a `td.descripcion` cell; other rows are skipped.
///
/// # Example
///
/// ```
/// use boletin_scraper::crawler::parse_listing;
/// use chrono::NaiveDate;
/// use url::Url;
///
/// let html = r#"<table><tr class="panel">
///     <td class="numero"><a href="/normativa/nacional/ley-1">Ley 1</a></td>
///     <td class="descripcion"> Presupuesto </td>
/// </tr></table>"#;
/// let base = Url::parse("https://www.argentina.gob.ar").unwrap();
/// let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
/// let page = parse_listing(html, &base, date);
/// assert_eq!(page.references[0].url, "https://www.argentina.gob.ar/normativa/nacional/ley-1");
/// assert_eq!(page.references[0].description, "Presupuesto");
/// ```
pub fn parse_listing(html: &str, base_url: &Url, date: NaiveDate) -> ListingPage {
    let document = Html::parse_document(html);
    let mut page = ListingPage::default();

    let (Ok(row_selector), Ok(numero_selector), Ok(descripcion_selector), Ok(link_selector)) = (
        Selector::parse("tr.panel"),
        Selector::parse("td.numero"),
        Selector::parse("td.descripcion"),
        Selector::parse("a"),
    ) else {
        return page;
    };

    for row in document.select(&row_selector) {
        page.row_count += 1;

        let numero = row.select(&numero_selector).next();
        let descripcion = row.select(&descripcion_selector).next();
        let (Some(numero), Some(descripcion)) = (numero, descripcion) else {
            tracing::debug!("Skipping listing row without numero/descripcion cell");
            continue;
        };

        let Some(href) = numero
            .select(&link_selector)
            .next()
            .and_then(|link| link.value().attr("href"))
        else {
            tracing::debug!("Skipping listing row without link");
            continue;
        };

        let Some(url) = resolve_link(href, base_url) else {
            tracing::debug!("Skipping listing row with unusable href {}", href);
            continue;
        };

        page.references.push(DocumentReference {
            url,
            date,
            description: element_text(descripcion),
        });
    }

    page
}

/// Parses a document detail page
///
/// The full-text link is the first `<a href>` containing `/actualizacion`,
/// or failing that the first one containing `/texto`.
pub fn parse_document_page(html: &str) -> DocumentPage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let entity = first_element(root, "p.lead.m-b-0")
        .and_then(|lead| first_element(lead, "small"))
        .map(element_text)
        .unwrap_or_default();

    DocumentPage {
        entity,
        title: first_text(root, "h2.h5"),
        name: first_text(root, "h1.h5"),
        summary: first_text(root, "article"),
        full_text_href: choose_full_text_link(&collect_hrefs(root, "a[href]")),
    }
}

/// Parses a full-text page, reading only its first `<article>`
pub fn parse_full_text(html: &str) -> FullTextPage {
    let document = Html::parse_document(html);

    match first_element(document.root_element(), "article") {
        Some(article) => FullTextPage {
            text: element_text(article),
            links: collect_hrefs(article, "a[href]"),
        },
        None => FullTextPage::default(),
    }
}

/// Picks the full-text link among a page's hrefs
pub fn choose_full_text_link(hrefs: &[String]) -> Option<String> {
    hrefs
        .iter()
        .find(|href| href.contains("/actualizacion"))
        .or_else(|| hrefs.iter().find(|href| href.contains("/texto")))
        .cloned()
}

/// Resolves a link href against the site origin
///
/// Returns None for empty hrefs, fragments, non-HTTP schemes and anything that
/// fails to parse.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Strips the site origin from a document URL, leaving its path and query
///
/// Origins are compared after parsing, so scheme and host case or an explicit
/// default port do not matter. URLs on another origin, or that fail to parse,
/// are returned unchanged.
pub fn canonical_path(url: &str, base_url: &Url) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.origin() == base_url.origin() => match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        },
        _ => url.to_string(),
    }
}

fn first_element<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    scope.select(&selector).next()
}

fn first_text(scope: ElementRef<'_>, css: &str) -> String {
    first_element(scope, css)
        .map(element_text)
        .unwrap_or_default()
}

fn collect_hrefs(scope: ElementRef<'_>, css: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(css) else {
        return Vec::new();
    };

    scope
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
