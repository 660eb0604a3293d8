//! Integration tests for dataset update and rebuild
//!
//! These tests run the store's date loop against a wiremock portal and check
//! what ends up in the JSON lines file.

use boletin_scraper::config::Config;
use boletin_scraper::crawler::{scrape_date, Harvester};
use boletin_scraper::storage::{DatasetStore, DocumentRecord};
use chrono::NaiveDate;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LISTING_PATH: &str = "/normativa/busqueda-avanzada";

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Creates a test configuration pointed at the mock portal
fn create_test_config(base_url: &str, dataset: &Path) -> Config {
    let mut config = Config::default();
    config.scraper.base_url = base_url.to_string();
    config.scraper.max_retries = 1;
    config.scraper.retry_sleep = 0;
    config.scraper.request_timeout = 5;
    config.dataset.path = dataset.display().to_string();
    config
}

fn listing_page(hrefs: &[String]) -> String {
    let rows: String = hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<tr class="panel"><td class="numero"><a href="{}">N</a></td><td class="descripcion">Ley</td></tr>"#,
                href
            )
        })
        .collect();
    format!("<html><body><table>{}</table></body></html>", rows)
}

/// Mounts a listing with `count` documents for `date`, and empty listings for
/// every other date and page
async fn mount_portal(server: &MockServer, date: &str, count: usize) {
    let hrefs: Vec<String> = (0..count)
        .map(|i| format!("/normativa/nacional/ley-{}", i))
        .collect();

    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("publicacion_desde", date))
        .and(query_param("offset", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&hrefs)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_page(&[])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/normativa/nacional/ley-\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><h1 class="h5">Ley</h1><article>Texto de la ley</article></body></html>"#,
        ))
        .mount(server)
        .await;
}

fn read_records(path: &Path) -> Vec<DocumentRecord> {
    std::fs::read_to_string(path)
        .expect("Failed to read dataset")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Invalid dataset line"))
        .collect()
}

fn seed_record(date: NaiveDate) -> DocumentRecord {
    DocumentRecord {
        title: "SEMILLA".to_string(),
        name: "Ley 1".to_string(),
        entity: String::new(),
        summary: "s".to_string(),
        full_text: "s".to_string(),
        url_in_articles: Vec::new(),
        date,
        url: "/normativa/nacional/ley-seed".to_string(),
    }
}

#[tokio::test]
async fn test_update_appends_only_dates_with_data() {
    let mock_server = MockServer::start().await;
    mount_portal(&mock_server, "2024-01-03", 4).await;

    let dir = TempDir::new().unwrap();
    let dataset = dir.path().join("boletin.jsonl");
    std::fs::write(
        &dataset,
        format!("{}\n", serde_json::to_string(&seed_record(day(2024, 1, 1))).unwrap()),
    )
    .unwrap();

    let config = create_test_config(&mock_server.uri(), &dataset);
    let harvester = Harvester::from_config(&config).expect("Failed to build harvester");
    let store = DatasetStore::new(&dataset);

    let summary = store
        .update(&harvester, day(2024, 1, 3))
        .await
        .expect("Update failed");

    assert_eq!(summary.dates_processed, 2);
    assert_eq!(summary.dates_without_data, 1);
    assert_eq!(summary.records_written, 4);

    let records = read_records(&dataset);
    assert_eq!(records.len(), 5);
    assert_eq!(records[0].title, "SEMILLA");
    assert!(records[1..].iter().all(|r| r.date == day(2024, 1, 3)));
    assert!(records[1..].iter().all(|r| r.full_text == "Texto de la ley"));
    assert_eq!(store.last_date(), Some(day(2024, 1, 3)));

    // both dates were queried, the empty one first
    let requests = mock_server.received_requests().await.unwrap();
    let queried: Vec<String> = requests
        .iter()
        .filter(|r| r.url.path() == LISTING_PATH)
        .filter_map(|r| {
            r.url
                .query_pairs()
                .find(|(k, _)| k == "publicacion_desde")
                .map(|(_, v)| v.into_owned())
        })
        .collect();
    assert_eq!(queried.first().map(String::as_str), Some("2024-01-02"));
    assert!(queried.iter().any(|d| d == "2024-01-03"));
    assert!(queried.iter().all(|d| d == "2024-01-02" || d == "2024-01-03"));
}

#[tokio::test]
async fn test_update_is_a_no_op_when_current() {
    let mock_server = MockServer::start().await;
    mount_portal(&mock_server, "2024-01-03", 2).await;

    let dir = TempDir::new().unwrap();
    let dataset = dir.path().join("boletin.jsonl");
    let seed = format!("{}\n", serde_json::to_string(&seed_record(day(2024, 1, 3))).unwrap());
    std::fs::write(&dataset, &seed).unwrap();

    let config = create_test_config(&mock_server.uri(), &dataset);
    let harvester = Harvester::from_config(&config).unwrap();
    let summary = DatasetStore::new(&dataset)
        .update(&harvester, day(2024, 1, 3))
        .await
        .unwrap();

    assert_eq!(summary.dates_processed, 0);
    assert_eq!(std::fs::read_to_string(&dataset).unwrap(), seed);
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rebuilds_from_start_date() {
    let mock_server = MockServer::start().await;
    mount_portal(&mock_server, "2024-01-02", 3).await;

    let dir = TempDir::new().unwrap();
    let dataset = dir.path().join("boletin.jsonl");
    std::fs::write(&dataset, "{\"date\":\"2030-12-31\"}\n").unwrap();

    let config = create_test_config(&mock_server.uri(), &dataset);
    let harvester = Harvester::from_config(&config).unwrap();
    let summary = DatasetStore::new(&dataset)
        .create(&harvester, day(2024, 1, 1), day(2024, 1, 3))
        .await
        .unwrap();

    assert_eq!(summary.dates_processed, 3);
    assert_eq!(summary.records_written, 3);

    let records = read_records(&dataset);
    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.date == day(2024, 1, 2)));
    let mut urls: Vec<&str> = records.iter().map(|r| r.url.as_str()).collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            "/normativa/nacional/ley-0",
            "/normativa/nacional/ley-1",
            "/normativa/nacional/ley-2"
        ]
    );
}

#[tokio::test]
async fn test_scrape_date_does_not_touch_dataset() {
    let mock_server = MockServer::start().await;
    mount_portal(&mock_server, "2023-12-11", 2).await;

    let dir = TempDir::new().unwrap();
    let dataset = dir.path().join("untouched.jsonl");
    let config = create_test_config(&mock_server.uri(), &dataset);

    let records = scrape_date(&config, day(2023, 12, 11)).await.unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.date == day(2023, 12, 11)));
    assert!(!dataset.exists());
}

#[tokio::test]
async fn test_unreachable_portal_still_completes() {
    let dir = TempDir::new().unwrap();
    let dataset = dir.path().join("boletin.jsonl");
    std::fs::write(&dataset, "{\"date\":\"2024-01-01\"}\n").unwrap();

    // Nothing listens on port 9
    let config = create_test_config("http://127.0.0.1:9", &dataset);
    let harvester = Harvester::from_config(&config).unwrap();
    let summary = DatasetStore::new(&dataset)
        .update(&harvester, day(2024, 1, 3))
        .await
        .expect("Fetch failures never abort the update");

    assert_eq!(summary.dates_processed, 2);
    assert_eq!(summary.dates_without_data, 2);
    assert_eq!(
        std::fs::read_to_string(&dataset).unwrap(),
        "{\"date\":\"2024-01-01\"}\n"
    );
}
