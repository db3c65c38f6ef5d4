//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! pipeline: reqwest transport, HTML extraction, classification, and the
//! JSON results file.

use product_trawler::config::Config;
use product_trawler::crawler::{crawl, Orchestrator};
use product_trawler::output::{DomainResult, JsonFileSink};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration for the given domains
fn create_test_config(domains: Vec<String>, max_depth: u32) -> Config {
    let mut config = Config {
        domains,
        ..Config::default()
    };
    config.crawler.max_depth = max_depth;
    config.crawler.inter_request_delay_ms = 10; // Very short for testing
    config.crawler.rate_limit_cooldown_ms = 10;
    config.crawler.request_timeout_ms = 5000;
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_products_found_through_intermediate_page() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/product/42">Widget</a><a href="/about">About us</a>"#,
    )
    .await;
    mount_page(&server, "/about", r#"<a href="/product/99">Gadget</a>"#).await;

    // Product pages are reported but never fetched
    Mock::given(method("GET"))
        .and(path("/product/42"))
        .respond_with(html(""))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(vec![base.clone()], 2);
    let results = crawl(config).await.expect("Crawl failed");

    assert_eq!(
        results,
        vec![DomainResult {
            domain: base.clone(),
            product_urls: vec![
                format!("{}/product/42", base),
                format!("{}/product/99", base),
            ],
            stats: results[0].stats,
        }]
    );
    assert_eq!(results[0].stats.pages_fetched, 2);
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/category">Shoes</a>"#).await;
    mount_page(
        &server,
        "/category",
        r#"<a href="/item/at-limit">In range</a><a href="/category/page-2">Next</a>"#,
    )
    .await;

    // Depth 2 non-product pages could only lead past the limit
    Mock::given(method("GET"))
        .and(path("/category/page-2"))
        .respond_with(html(r#"<a href="/item/too-deep">Deep</a>"#))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(vec![base.clone()], 2);
    let results = crawl(config).await.expect("Crawl failed");

    assert_eq!(
        results[0].product_urls,
        vec![format!("{}/item/at-limit", base)]
    );
}

#[tokio::test]
async fn test_cyclic_links_terminate() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/loop">Loop</a><a href="/">Home</a>"#).await;
    mount_page(
        &server,
        "/loop",
        r#"<a href="/">Home</a><a href="/loop">Again</a><a href="/p/1">One</a>"#,
    )
    .await;

    let config = create_test_config(vec![base.clone()], 10);
    let results = crawl(config).await.expect("Crawl failed");

    assert_eq!(results[0].product_urls, vec![format!("{}/p/1", base)]);
}

#[tokio::test]
async fn test_rate_limited_page_is_retried_then_dropped() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/busy">Busy</a><a href="/ok">Fine</a>"#,
    )
    .await;
    mount_page(&server, "/ok", r#"<a href="/product/ok">Ok</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(vec![base.clone()], 2);
    let results = crawl(config).await.expect("Crawl failed");

    assert_eq!(results[0].product_urls, vec![format!("{}/product/ok", base)]);
    assert_eq!(results[0].stats.pages_rate_limited, 1);
}

#[tokio::test]
async fn test_rate_limit_recovery() {
    let server = MockServer::start().await;
    let base = server.uri();

    // First two requests are throttled, later ones fall through to the page
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    mount_page(&server, "/", r#"<a href="/product/1">One</a>"#).await;

    let config = create_test_config(vec![base.clone()], 1);
    let results = crawl(config).await.expect("Crawl failed");

    assert_eq!(results[0].product_urls, vec![format!("{}/product/1", base)]);
}

#[tokio::test]
async fn test_domains_are_isolated_and_failures_contained() {
    let shop = MockServer::start().await;
    let broken = MockServer::start().await;

    mount_page(&shop, "/", r#"<a href="/product/a">A</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&broken)
        .await;

    // Nothing listens on port 9 on loopback
    let unreachable = "http://127.0.0.1:9".to_string();
    let domains = vec![broken.uri(), shop.uri(), unreachable.clone()];

    let config = create_test_config(domains, 2);
    let results = crawl(config).await.expect("Crawl failed");

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].domain, broken.uri());
    assert!(results[0].product_urls.is_empty());
    assert_eq!(results[1].product_urls, vec![format!("{}/product/a", shop.uri())]);
    assert_eq!(results[2].domain, unreachable);
    assert!(results[2].product_urls.is_empty());
}

#[tokio::test]
async fn test_browser_user_agent_is_sent() {
    let server = MockServer::start().await;
    let base = server.uri();

    let mut config = create_test_config(vec![base.clone()], 1);
    config.user_agent.value = "Mozilla/5.0 (TestSuite)".to_string();

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", "Mozilla/5.0 (TestSuite)"))
        .respond_with(html(r#"<a href="/p/ua">UA</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let results = crawl(config).await.expect("Crawl failed");
    assert_eq!(results[0].product_urls, vec![format!("{}/p/ua", base)]);
}

#[tokio::test]
async fn test_results_file_round_trip() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(&server, "/", r#"<a href="/item/7">Seven</a><a href="/item/7#x">Dup</a>"#).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let results_path = dir.path().join("out/products.json");

    let config = create_test_config(vec![base.clone()], 1);
    let orchestrator = Orchestrator::new(config).expect("Failed to create orchestrator");
    let results = orchestrator
        .run_into(&JsonFileSink::new(&results_path))
        .await
        .expect("Failed to write results");
    assert_eq!(results.len(), 1);

    let written: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(&results_path).expect("Failed to read results"),
    )
    .expect("Results are not valid JSON");

    assert_eq!(
        written,
        serde_json::json!([
            { "domain": base, "productUrls": [format!("{}/item/7", base)] }
        ])
    );
}
