//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the tutor directory and exercise
//! the fetcher, listing crawler and full harvest end-to-end.

use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tutor_harvest::cache::ResponseCache;
use tutor_harvest::config::{Config, FilterConfig, SiteConfig};
use tutor_harvest::crawler::{
    build_http_client, crawl_listings, run_harvest, CircuitBreaker, Coordinator, Fetcher,
    RetryPolicy,
};
use tutor_harvest::model::FilterPair;
use tutor_harvest::output::MemoryOutput;
use tutor_harvest::FetchError;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration against the mock server
fn create_test_config(base_url: &str, dir: &Path, locations: &[&str], subjects: &[&str]) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.site.request_timeout_secs = 5;
    config.crawler.request_delay_ms = 0;
    config.crawler.backoff_base_ms = 1;
    config.crawler.fetch_attempts = 2;
    config.crawler.max_concurrent_profiles = 4;
    config.output.cache_dir = dir.join("cache").display().to_string();
    config.output.csv_path = dir.join("tutor_data.csv").display().to_string();
    config.filters = FilterConfig {
        locations: locations.iter().map(|s| s.to_string()).collect(),
        subjects: subjects.iter().map(|s| s.to_string()).collect(),
    };
    config
}

async fn create_test_fetcher(dir: &Path, attempts: u32) -> Fetcher {
    let cache = ResponseCache::open(dir.join("cache"))
        .await
        .expect("Failed to open cache");
    let client = build_http_client(&SiteConfig::default()).expect("Failed to build client");
    Fetcher::new(
        client,
        cache,
        RetryPolicy {
            attempts,
            delay: Duration::ZERO,
            backoff_base: Duration::from_millis(1),
        },
    )
}

fn results_page(links: &[String], pages: &[u32]) -> String {
    let rows: String = links
        .iter()
        .map(|l| format!(r#"<tr class="clickable-row" data-href="{}"><td>Tutor</td></tr>"#, l))
        .collect();
    let pagination: String = pages
        .iter()
        .map(|p| format!(r#"<li class="page-item"><a class="page-link" href="?Page={p}">{p}</a></li>"#))
        .collect();

    format!(
        r#"<html><body>
        <table class="tf-table"><tbody>{}</tbody></table>
        <ul class="pagination">{}</ul>
        </body></html>"#,
        rows, pagination
    )
}

fn profile_page(name: &str, email: &str, phone: &str) -> String {
    format!(
        r#"<html><body>
        <div class="tf-profile-header"><h1>{name} <span class="c_blue">Somewhere</span></h1></div>
        <div class="tf-profile">
          <h3>Experience</h3><p>Years of tutoring</p>
          <h3>Rates</h3><p>$55/hr</p>
          <h3>Gender</h3><p>Female</p>
          <h3>Registered</h3><p>01-Feb-2020 (updated profile on 05-Jan-2024)</p>
          <div class="tf-submit-container"><a>Send</a></div>
        </div>
        <span class="c_link">{email}</span>
        <span class="c_link">{phone}</span>
        </body></html>"#
    )
}

async fn mount_listing(server: &MockServer, location: &str, subject: &str, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/regions/{}/{}/", location, subject)))
        .and(query_param("Page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_second_fetch_served_from_cache() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/tutor/jane"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>jane</html>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_test_fetcher(dir.path(), 3).await;
    let url = format!("{}/tutor/jane", mock_server.uri());

    let first = fetcher.fetch(&url).await.expect("First fetch failed");
    let second = fetcher.fetch(&url).await.expect("Second fetch failed");

    assert_eq!(first, second);
    let stats = fetcher.stats();
    assert_eq!(stats.network_requests, 1);
    assert_eq!(stats.cache_hits, 1);
    assert!(fetcher.cache().path_for(&url).is_file());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_retry_after_transient_failure() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // First request fails, the next one succeeds
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/flaky", "<html>ok</html>".to_string()).await;

    let fetcher = create_test_fetcher(dir.path(), 3).await;
    let body = fetcher
        .fetch(&format!("{}/flaky", mock_server.uri()))
        .await
        .expect("Fetch should succeed on retry");

    assert_eq!(body, "<html>ok</html>");
    let stats = fetcher.stats();
    assert_eq!(stats.network_requests, 2);
    assert_eq!(stats.retries, 1);
    assert_eq!(stats.failures, 0);
}

#[tokio::test]
async fn test_exhausted_retries_return_last_error() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&mock_server)
        .await;

    let fetcher = create_test_fetcher(dir.path(), 3).await;
    let url = format!("{}/down", mock_server.uri());
    let result = fetcher.fetch(&url).await;

    match result {
        Err(FetchError::Exhausted {
            attempts, source, ..
        }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*source, FetchError::Status { status: 503, .. }));
        }
        other => panic!("Expected exhausted retries, got {:?}", other),
    }

    // Failures are never cached
    assert!(!fetcher.cache().path_for(&url).exists());
    assert_eq!(fetcher.stats().failures, 1);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_breaker_short_circuits_after_failures() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = create_test_fetcher(dir.path(), 1)
        .await
        .with_breaker(CircuitBreaker::new(1, Duration::from_secs(60)));

    let first = fetcher.fetch(&format!("{}/a", mock_server.uri())).await;
    assert!(matches!(first, Err(FetchError::Exhausted { .. })));

    let second = fetcher.fetch(&format!("{}/b", mock_server.uri())).await;
    assert!(matches!(second, Err(FetchError::CircuitOpen { .. })));

    mock_server.verify().await;
}

#[tokio::test]
async fn test_pagination_follows_next_control() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(
        &mock_server,
        "perth",
        "physics",
        1,
        results_page(&["/tutor/a".to_string(), "/tutor/b".to_string()], &[1, 2, 3]),
    )
    .await;
    mount_listing(
        &mock_server,
        "perth",
        "physics",
        2,
        results_page(&["/tutor/c".to_string()], &[1, 2, 3]),
    )
    .await;
    mount_listing(
        &mock_server,
        "perth",
        "physics",
        3,
        results_page(&["/tutor/d".to_string()], &[1, 2, 3]),
    )
    .await;

    let fetcher = create_test_fetcher(dir.path(), 1).await;
    let base = Url::parse(&mock_server.uri()).unwrap();
    let crawl = crawl_listings(&fetcher, &base, &FilterPair::new("perth", "physics"), None).await;

    assert_eq!(crawl.links, vec!["/tutor/a", "/tutor/b", "/tutor/c", "/tutor/d"]);
    assert_eq!(crawl.pages, 3);
    assert!(!crawl.failed);
}

#[tokio::test]
async fn test_page_cap_stops_pagination() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(
        &mock_server,
        "perth",
        "physics",
        1,
        results_page(&["/tutor/a".to_string()], &[1, 2]),
    )
    .await;

    Mock::given(method("GET"))
        .and(query_param("Page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let fetcher = create_test_fetcher(dir.path(), 1).await;
    let base = Url::parse(&mock_server.uri()).unwrap();
    let crawl =
        crawl_listings(&fetcher, &base, &FilterPair::new("perth", "physics"), Some(1)).await;

    assert_eq!(crawl.links, vec!["/tutor/a"]);
    mock_server.verify().await;
}

#[tokio::test]
async fn test_empty_listing_page_ends_pagination() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // A stray "next" control on an empty page must not be followed
    mount_listing(&mock_server, "perth", "physics", 1, results_page(&[], &[1, 2])).await;

    Mock::given(method("GET"))
        .and(query_param("Page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let fetcher = create_test_fetcher(dir.path(), 1).await;
    let base = Url::parse(&mock_server.uri()).unwrap();
    let crawl = crawl_listings(&fetcher, &base, &FilterPair::new("perth", "physics"), None).await;

    assert!(crawl.links.is_empty());
    assert!(!crawl.failed);
    assert_eq!(crawl.pages, 1);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_failed_page_keeps_collected_links() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_listing(
        &mock_server,
        "perth",
        "physics",
        1,
        results_page(&["/tutor/a".to_string()], &[1, 2]),
    )
    .await;
    // Page 2 is not mounted: wiremock answers 404

    let fetcher = create_test_fetcher(dir.path(), 2).await;
    let base = Url::parse(&mock_server.uri()).unwrap();
    let crawl = crawl_listings(&fetcher, &base, &FilterPair::new("perth", "physics"), None).await;

    assert_eq!(crawl.links, vec!["/tutor/a"]);
    assert!(crawl.failed);
    assert_eq!(crawl.pages, 1);
}

#[tokio::test]
async fn test_full_harvest() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    // perth/physics: two pages, three links, one broken profile
    mount_listing(
        &mock_server,
        "perth",
        "physics",
        1,
        results_page(&["/tutor/a".to_string(), "/tutor/b".to_string()], &[1, 2]),
    )
    .await;
    mount_listing(
        &mock_server,
        "perth",
        "physics",
        2,
        results_page(&[format!("{}/tutor/c", base_url)], &[1, 2]),
    )
    .await;

    // sydney/physics: listing always fails
    Mock::given(method("GET"))
        .and(path("/regions/sydney/physics/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&mock_server)
        .await;

    mount_page(
        &mock_server,
        "/tutor/a",
        profile_page("Alice Smith", "alice@example.com", "0412 345 678"),
    )
    .await;
    mount_page(
        &mock_server,
        "/tutor/b",
        profile_page("Bob Jones", "bob at example dot com", "(03) 9999 8888"),
    )
    .await;
    // /tutor/c is not mounted: 404 on every attempt, so no record

    let config = create_test_config(&base_url, dir.path(), &["perth", "sydney"], &["physics"]);
    let csv_path = config.output.csv_path.clone();

    let stats = run_harvest(config).await.expect("Harvest failed");

    assert_eq!(stats.pairs_processed, 2);
    assert_eq!(stats.listing_failures, 1);
    assert_eq!(stats.links_found, 3);
    assert_eq!(stats.records_extracted, 2);
    assert_eq!(stats.extraction_failures, 1);
    assert!(stats.output_written);

    let mut reader = csv::Reader::from_path(&csv_path).expect("CSV not written");
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers,
        vec![
            "Link",
            "Name",
            "Contact Info",
            "Experience",
            "Qualifications",
            "Rates",
            "Gender",
            "Registered",
            "Location",
            "Subject",
            "email_extract",
            "mobile_extract"
        ]
    );

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    assert_eq!(&rows[0][0], format!("{}/tutor/a", base_url));
    assert_eq!(&rows[0][1], "Alice Smith Somewhere");
    assert_eq!(&rows[0][2], "alice@example.com\n0412 345 678");
    assert_eq!(&rows[0][3], "Years of tutoring");
    assert_eq!(&rows[0][4], "");
    assert_eq!(&rows[0][5], "$55/hr");
    assert_eq!(&rows[0][6], "Female");
    assert_eq!(&rows[0][7], "01-Feb-2020");
    assert_eq!(&rows[0][8], "Perth");
    assert_eq!(&rows[0][9], "Physics");
    assert_eq!(&rows[0][10], "alice@example.com");
    assert_eq!(&rows[0][11], "0412345678");

    assert_eq!(&rows[1][1], "Bob Jones Somewhere");
    assert_eq!(&rows[1][10], "N/A");
    assert_eq!(&rows[1][11], "(03)99998888");

    mock_server.verify().await;
}

#[tokio::test]
async fn test_rerun_is_idempotent_and_uses_cache() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_listing(
        &mock_server,
        "perth",
        "physics",
        1,
        results_page(&["/tutor/a".to_string()], &[1]),
    )
    .await;
    mount_listing(
        &mock_server,
        "perth",
        "chemistry",
        1,
        results_page(&["/tutor/a".to_string()], &[1]),
    )
    .await;
    mount_page(
        &mock_server,
        "/tutor/a",
        profile_page("Alice Smith", "alice@example.com", "0412 345 678"),
    )
    .await;

    let config = create_test_config(&base_url, dir.path(), &["perth"], &["physics", "chemistry"]);

    let mut first_output = MemoryOutput::default();
    let mut coordinator = Coordinator::new(config.clone()).await.unwrap();
    let first_stats = coordinator.run(&mut first_output).await;

    // The same profile under two subjects yields two rows, in pair order
    assert_eq!(first_output.records.len(), 2);
    assert_eq!(first_output.records[0].subject, "Physics");
    assert_eq!(first_output.records[1].subject, "Chemistry");
    assert_eq!(first_output.records[0].link, first_output.records[1].link);
    // Listing pages and the profile once; the repeated profile is a cache hit
    assert_eq!(first_stats.fetch.network_requests, 3);

    // With the site gone, everything must come from the cache
    mock_server.reset().await;

    let mut second_output = MemoryOutput::default();
    let mut coordinator = Coordinator::new(config).await.unwrap();
    let second_stats = coordinator.run(&mut second_output).await;

    assert_eq!(second_stats.fetch.network_requests, 0);
    assert_eq!(first_output.records, second_output.records);
}

#[tokio::test]
async fn test_harvest_recovers_after_outage() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    // The host is down for the first two requests, then healthy
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    let subjects = ["physics", "chemistry", "english", "maths"];
    for subject in subjects {
        mount_listing(
            &mock_server,
            "perth",
            subject,
            1,
            results_page(&["/tutor/a".to_string()], &[1]),
        )
        .await;
    }
    mount_page(
        &mock_server,
        "/tutor/a",
        profile_page("Alice Smith", "alice@example.com", "0412 345 678"),
    )
    .await;

    let mut config = create_test_config(&base_url, dir.path(), &["perth"], &subjects);
    config.crawler.fetch_attempts = 1;

    let mut output = MemoryOutput::default();
    let mut coordinator = Coordinator::new(config).await.unwrap();
    let stats = coordinator.run(&mut output).await;

    // Only the pairs whose listing hit the outage are lost
    assert_eq!(stats.pairs_processed, 4);
    assert_eq!(stats.listing_failures, 2);
    assert_eq!(stats.records_extracted, 2);
    let subjects: Vec<&str> = output.records.iter().map(|r| r.subject.as_str()).collect();
    assert_eq!(subjects, vec!["English", "Maths"]);
}
