//! Integration tests for the pipeline
//!
//! These tests use wiremock to stand up a search backend and content sites
//! and run the full search, fetch and extract cycle end-to-end.

use plethora::config::{CacheBackend, Config};
use plethora::crawler::{Coordinator, RunRequest};
use plethora::search::SearchError;
use plethora::{DetailLevel, PageRecord, PlethoraError};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates a test configuration pointed at a mock search backend
fn create_test_config(search_server: &MockServer, cache_dir: &Path) -> Config {
    let mut config = Config::default();
    config.search.endpoint = format!("{}/html/", search_server.uri());
    config.search.max_pages = 3;
    config.http.timeout_secs = 5;
    config.http.max_retries = 3;
    config.http.backoff_base_ms = 10;
    config.http.backoff_max_ms = 40;
    config.politeness.min_domain_interval_ms = 0;
    config.cache.path = cache_dir.join("cache").display().to_string();
    config.pipeline.workers = 4;
    config
}

fn request(query: &str, level: DetailLevel, config: &Config) -> RunRequest {
    RunRequest {
        level,
        ..RunRequest::from_config(query, config)
    }
}

/// Renders a results page whose links go through a `uddg` redirector
fn results_page(urls: &[String]) -> String {
    let blocks: String = urls
        .iter()
        .enumerate()
        .map(|(i, url)| {
            let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
            format!(
                r#"<div class="result results_links">
                    <h2 class="result__title"><a class="result__a" href="//duckduckgo.com/l/?uddg={}&amp;rut=x">Result {}</a></h2>
                    <a class="result__snippet">Snippet {}</a>
                </div>"#,
                encoded, i, i
            )
        })
        .collect();
    format!("<html><body><div id=\"links\">{}</div></body></html>", blocks)
}

/// Mounts a single results page answering every search query
async fn mount_search(server: &MockServer, urls: &[String]) {
    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(results_page(urls))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn article(title: &str, links: &[String]) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!(r#"<a href="{}">link</a>"#, l))
        .collect();
    format!(
        r#"<html><head><title>{title}</title><meta name="description" content="About {title}"></head>
        <body><nav><a href="/nav-only">Nav</a></nav>
        <article><h1>{title}</h1>
        <p>This paragraph about {title} is long enough to be kept by the extractor.</p>
        {anchors}</article></body></html>"#
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn requests_to(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}

/// Records the arrival time of every request it answers
struct StampingResponder {
    stamps: Arc<Mutex<Vec<Instant>>>,
    body: String,
}

impl Respond for StampingResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.stamps.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200)
            .set_body_string(self.body.clone())
            .insert_header("content-type", "text/html")
    }
}

#[tokio::test]
async fn test_pages_follow_search_order() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    for (page_path, delay) in [("/slow", 400), ("/medium", 200), ("/fast", 0)] {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(article(page_path, &[]))
                    .insert_header("content-type", "text/html")
                    .set_delay(Duration::from_millis(delay)),
            )
            .mount(&site)
            .await;
    }

    let urls: Vec<String> = ["/slow", "/medium", "/fast"]
        .iter()
        .map(|p| format!("{}{}", site.uri(), p))
        .collect();
    mount_search(&search, &urls).await;

    let mut config = create_test_config(&search, temp.path());
    config.cache.enabled = false;
    let coordinator = Coordinator::from_config(&config).unwrap();

    let result = coordinator
        .run(request("ordering", DetailLevel::Medium, &config))
        .await
        .unwrap();

    let page_urls: Vec<&str> = result.pages.iter().map(|p| p.url()).collect();
    assert_eq!(page_urls, urls.iter().map(String::as_str).collect::<Vec<_>>());
    assert!(result.pages.iter().all(PageRecord::is_content));
    assert_eq!(result.pages[0].content().unwrap().title, "/slow");
}

#[tokio::test]
async fn test_cached_run_makes_no_page_requests() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_page(&site, "/doc", article("Cached doc", &[])).await;
    mount_search(&search, &[format!("{}/doc", site.uri())]).await;

    let config = create_test_config(&search, temp.path());

    let first = Coordinator::from_config(&config)
        .unwrap()
        .run(request("cache", DetailLevel::Medium, &config))
        .await
        .unwrap();
    assert_eq!(requests_to(&site, "/doc").await, 1);
    assert!(!first.pages[0].from_cache());

    let second = Coordinator::from_config(&config)
        .unwrap()
        .run(request("cache", DetailLevel::Medium, &config))
        .await
        .unwrap();

    assert_eq!(requests_to(&site, "/doc").await, 1);
    assert!(second.pages[0].from_cache());
    assert_eq!(first.pages[0].content(), second.pages[0].content());
    assert_eq!(second.stats().pages.from_cache, 1);
}

#[tokio::test]
async fn test_sqlite_cache_backend() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_page(&site, "/doc", article("Sqlite doc", &[])).await;
    mount_search(&search, &[format!("{}/doc", site.uri())]).await;

    let mut config = create_test_config(&search, temp.path());
    config.cache.backend = CacheBackend::Sqlite;
    config.cache.path = temp.path().join("cache.db").display().to_string();

    for _ in 0..2 {
        Coordinator::from_config(&config)
            .unwrap()
            .run(request("cache", DetailLevel::Medium, &config))
            .await
            .unwrap();
    }

    assert_eq!(requests_to(&site, "/doc").await, 1);
    assert!(temp.path().join("cache.db").exists());
}

#[tokio::test]
async fn test_expired_cache_entry_is_refetched() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_page(&site, "/doc", article("Stale doc", &[])).await;
    mount_search(&search, &[format!("{}/doc", site.uri())]).await;

    let config = create_test_config(&search, temp.path());
    Coordinator::from_config(&config)
        .unwrap()
        .run(request("ttl", DetailLevel::Medium, &config))
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;

    let zero_ttl = RunRequest {
        cache_ttl: Duration::ZERO,
        ..request("ttl", DetailLevel::Medium, &config)
    };
    let result = Coordinator::from_config(&config).unwrap().run(zero_ttl).await.unwrap();

    assert_eq!(requests_to(&site, "/doc").await, 2);
    assert!(!result.pages[0].from_cache());
}

#[tokio::test]
async fn test_unopenable_cache_runs_uncached() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_page(&site, "/doc", article("No cache", &[])).await;
    mount_search(&search, &[format!("{}/doc", site.uri())]).await;

    // A regular file where the cache directory should be
    let blocker = temp.path().join("not-a-dir");
    std::fs::write(&blocker, b"occupied").unwrap();

    let mut config = create_test_config(&search, temp.path());
    config.cache.path = blocker.join("cache").display().to_string();

    for _ in 0..2 {
        let result = Coordinator::from_config(&config)
            .unwrap()
            .run(request("nocache", DetailLevel::Medium, &config))
            .await
            .unwrap();
        assert!(result.pages[0].is_content());
        assert!(!result.pages[0].from_cache());
    }

    assert_eq!(requests_to(&site, "/doc").await, 2);
}

#[tokio::test]
async fn test_same_domain_requests_are_spaced() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let stamps = Arc::new(Mutex::new(Vec::new()));
    for page_path in ["/one", "/two", "/three"] {
        Mock::given(method("GET"))
            .and(path(page_path))
            .respond_with(StampingResponder {
                stamps: stamps.clone(),
                body: article(page_path, &[]),
            })
            .mount(&site)
            .await;
    }

    let urls: Vec<String> = ["/one", "/two", "/three"]
        .iter()
        .map(|p| format!("{}{}", site.uri(), p))
        .collect();
    mount_search(&search, &urls).await;

    let mut config = create_test_config(&search, temp.path());
    config.cache.enabled = false;
    config.politeness.min_domain_interval_ms = 250;

    Coordinator::from_config(&config)
        .unwrap()
        .run(request("polite", DetailLevel::Medium, &config))
        .await
        .unwrap();

    let mut stamps = stamps.lock().unwrap().clone();
    stamps.sort();
    assert_eq!(stamps.len(), 3);
    for pair in stamps.windows(2) {
        let gap = pair[1] - pair[0];
        assert!(gap >= Duration::from_millis(230), "gap was {:?}", gap);
    }
}

#[tokio::test]
async fn test_robots_disallowed_page_is_never_requested() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .mount(&site)
        .await;
    mount_page(&site, "/private/report", article("Secret", &[])).await;
    mount_page(&site, "/open", article("Open", &[])).await;

    mount_search(
        &search,
        &[
            format!("{}/private/report", site.uri()),
            format!("{}/open", site.uri()),
        ],
    )
    .await;

    let config = create_test_config(&search, temp.path());
    let result = Coordinator::from_config(&config)
        .unwrap()
        .run(request("robots", DetailLevel::Medium, &config))
        .await
        .unwrap();

    match &result.pages[0] {
        PageRecord::Error {
            is_robots_blocked,
            error_message,
            ..
        } => {
            assert!(is_robots_blocked);
            assert!(error_message.contains("robots.txt"));
        }
        other => panic!("expected a robots-blocked record, got {:?}", other),
    }
    assert!(result.pages[1].is_content());

    assert_eq!(requests_to(&site, "/private/report").await, 0);
    assert!(requests_to(&site, "/robots.txt").await >= 1);
    assert_eq!(result.stats().pages.robots_blocked, 1);
}

#[tokio::test]
async fn test_forbidden_robots_blocks_site() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&site)
        .await;
    mount_page(&site, "/page", article("Page", &[])).await;
    mount_search(&search, &[format!("{}/page", site.uri())]).await;

    let config = create_test_config(&search, temp.path());
    let result = Coordinator::from_config(&config)
        .unwrap()
        .run(request("forbidden", DetailLevel::Medium, &config))
        .await
        .unwrap();

    assert!(result.pages[0].is_robots_blocked());
    assert_eq!(requests_to(&site, "/page").await, 0);
}

#[tokio::test]
async fn test_rust_ownership_high_detail_scenario() {
    let search = MockServer::start().await;
    let sites = [
        MockServer::start().await,
        MockServer::start().await,
        MockServer::start().await,
    ];
    let elsewhere = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let mut parents = Vec::new();
    for (i, site) in sites.iter().enumerate() {
        let links = vec![
            format!("{}/elsewhere/{}", elsewhere.uri(), i),
            "/guide/borrowing".to_string(),
            "/guide/lifetimes".to_string(),
            "/login".to_string(),
        ];
        mount_page(site, "/ownership", article(&format!("Ownership {}", i), &links)).await;
        mount_page(site, "/guide/borrowing", article("Borrowing", &[])).await;
        mount_page(site, "/guide/lifetimes", article("Lifetimes", &[])).await;
        parents.push(format!("{}/ownership", site.uri()));
    }

    // Three provider pages, one result each, in order A, B, C
    for (offset, parent) in [("10", &parents[1]), ("20", &parents[2])] {
        Mock::given(method("GET"))
            .and(path("/html/"))
            .and(query_param("s", offset))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(results_page(&[parent.clone()])),
            )
            .mount(&search)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", "rust ownership"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[parents[0].clone()])))
        .mount(&search)
        .await;

    let config = create_test_config(&search, temp.path());
    let run = RunRequest {
        desired_count: 3,
        max_subpages: 1,
        ..request("rust ownership", DetailLevel::High, &config)
    };
    let result = Coordinator::from_config(&config).unwrap().run(run).await.unwrap();

    let search_urls: Vec<&str> = result.search_results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(search_urls, parents.iter().map(String::as_str).collect::<Vec<_>>());

    let page_urls: Vec<&str> = result.pages.iter().map(|p| p.url()).collect();
    assert_eq!(page_urls, search_urls);

    assert_eq!(result.subpages.len(), 3);
    for (parent, site) in parents.iter().zip(&sites) {
        let subs = result.subpages_for(parent);
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].url(), format!("{}/guide/borrowing", site.uri()));
        assert!(subs[0].is_content());
    }

    assert!(elsewhere.received_requests().await.unwrap_or_default().is_empty());
    for site in &sites {
        assert_eq!(requests_to(site, "/login").await, 0);
        assert_eq!(requests_to(site, "/guide/lifetimes").await, 0);
    }
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&site)
        .await;
    mount_page(&site, "/flaky", article("Flaky", &[])).await;
    mount_search(&search, &[format!("{}/flaky", site.uri())]).await;

    let mut config = create_test_config(&search, temp.path());
    config.cache.enabled = false;

    let result = Coordinator::from_config(&config)
        .unwrap()
        .run(request("retry", DetailLevel::Medium, &config))
        .await
        .unwrap();

    assert_eq!(requests_to(&site, "/flaky").await, 3);
    assert!(result.pages[0].is_content());
    assert_eq!(result.pages[0].content().unwrap().title, "Flaky");
}

#[tokio::test]
async fn test_permanent_failure_becomes_error_record() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/data.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .insert_header("content-type", "application/json"),
        )
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/paper.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(&site)
        .await;
    mount_search(
        &search,
        &[
            format!("{}/gone", site.uri()),
            format!("{}/data.json", site.uri()),
            format!("{}/paper.pdf", site.uri()),
        ],
    )
    .await;

    let config = create_test_config(&search, temp.path());
    let result = Coordinator::from_config(&config)
        .unwrap()
        .run(request("errors", DetailLevel::High, &config))
        .await
        .unwrap();

    assert_eq!(requests_to(&site, "/gone").await, 1);
    match &result.pages[0] {
        PageRecord::Error { error_message, is_robots_blocked, .. } => {
            assert_eq!(error_message, "HTTP status 404");
            assert!(!is_robots_blocked);
        }
        other => panic!("expected an error record, got {:?}", other),
    }
    assert!(result.pages[1].is_error());
    match &result.pages[2] {
        PageRecord::Error { error_message, .. } => {
            assert_eq!(error_message, "Unsupported content type: application/pdf");
        }
        other => panic!("expected an error record, got {:?}", other),
    }

    // Failed parents are never expanded
    assert!(result.subpages.is_empty());
}

#[tokio::test]
async fn test_cache_disabled_fetches_every_time() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_page(&site, "/doc", article("Uncached", &[])).await;
    mount_search(&search, &[format!("{}/doc", site.uri())]).await;

    let config = create_test_config(&search, temp.path());
    let coordinator = Coordinator::from_config(&config).unwrap();
    let uncached = RunRequest {
        use_cache: false,
        ..request("nocache", DetailLevel::Medium, &config)
    };

    coordinator.run(uncached.clone()).await.unwrap();
    coordinator.run(uncached).await.unwrap();

    assert_eq!(requests_to(&site, "/doc").await, 2);
}

#[tokio::test]
async fn test_low_detail_only_searches() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_page(&site, "/doc", article("Doc", &[])).await;
    mount_search(&search, &[format!("{}/doc", site.uri())]).await;

    let config = create_test_config(&search, temp.path());
    let result = Coordinator::from_config(&config)
        .unwrap()
        .run(request("low", DetailLevel::Low, &config))
        .await
        .unwrap();

    assert_eq!(result.search_results.len(), 1);
    assert_eq!(result.search_results[0].title, "Result 0");
    assert_eq!(result.search_results[0].snippet, "Snippet 0");
    assert!(result.pages.is_empty());
    assert!(site.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_search_outage_fails_run() {
    let search = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&search)
        .await;

    let mut config = create_test_config(&search, temp.path());
    config.http.max_retries = 0;

    let outcome = Coordinator::from_config(&config)
        .unwrap()
        .run(request("outage", DetailLevel::Medium, &config))
        .await;

    match outcome {
        Err(PlethoraError::Search(SearchError::Unavailable { pages, .. })) => assert_eq!(pages, 3),
        other => panic!("expected a search failure, got {:?}", other.map(|r| r.query)),
    }
}

#[tokio::test]
async fn test_result_serializes_to_json() {
    let search = MockServer::start().await;
    let site = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    mount_page(&site, "/doc", article("Json doc", &[])).await;
    mount_search(&search, &[format!("{}/doc", site.uri())]).await;

    let mut config = create_test_config(&search, temp.path());
    config.cache.enabled = false;
    let result = Coordinator::from_config(&config)
        .unwrap()
        .run(request("json", DetailLevel::Medium, &config))
        .await
        .unwrap();

    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert_eq!(json["level"], "medium");
    assert_eq!(json["pages"][0]["status"], "content");
    assert_eq!(json["pages"][0]["source"], "network");
    assert_eq!(json["pages"][0]["title"], "Json doc");
    assert_eq!(json["pages"][0]["meta_description"], "About Json doc");
}
