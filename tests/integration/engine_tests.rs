//! Integration tests for the engine
//!
//! These tests use wiremock to stand in for both the search engine and the
//! target sites, and drive the plain-HTTP browser backend end to end.
//!
//! The mock search engine is addressed as `localhost` and the target pages as
//! `127.0.0.1`, so the engine's own-host exclusion does not drop the hits.

use dorkscan::config::Config;
use dorkscan::crawler::Engine;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY: &str = "digital marketing agency";

/// Creates a fast configuration pointed at the mock search engine
fn create_test_config(server: &MockServer) -> Config {
    let port = server.address().port();
    let mut config = Config::default();
    config.search.base_url = format!("http://localhost:{}/search", port);
    config.engine.per_request_delay_ms = 0;
    config.engine.settle_delay_ms = 0;
    config.engine.inter_dork_delay_ms = 0;
    config.engine.inter_page_delay_ms = 0;
    config.engine.inter_batch_delay_ms = 0;
    config.engine.fetch_timeout_ms = 5_000;
    config.crawl.excluded_domains.clear();
    config
}

/// URL of a target page on the mock server
fn target(server: &MockServer, page: &str) -> String {
    format!("http://127.0.0.1:{}/{}", server.address().port(), page)
}

fn serp(links: &[String]) -> String {
    let blocks: String = links
        .iter()
        .enumerate()
        .map(|(i, href)| {
            format!(
                r#"<div class="g"><a href="{}"><h3>Agency {}</h3></a><div class="VwiC3b">Result {}</div></div>"#,
                href, i, i
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="search">{}</div></body></html>"#,
        blocks
    )
}

fn agency_page(name: &str) -> String {
    format!(
        r#"<html><head><title>{}</title></head><body>
        <h1>{}</h1>
        <p>We grow local businesses with search and social campaigns.</p>
        <div><p>Contact us: hello@{}.test</p></div>
        <a href="https://www.linkedin.com/company/{}">LinkedIn</a>
        </body></html>"#,
        name, name, name, name
    )
}

async fn mount_search(server: &MockServer, search_query: &str, links: &[String]) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", search_query))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(serp(links))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/{}", page)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_single_dork_all_pages_succeed() {
    let server = MockServer::start().await;
    let pages = ["acme", "bolt", "cove"];
    let links: Vec<String> = pages.iter().map(|p| target(&server, p)).collect();

    mount_search(&server, &format!("{} site:linkedin.com", QUERY), &links).await;
    for page in pages {
        mount_page(&server, page, agency_page(page)).await;
    }

    let engine = Engine::new(create_test_config(&server)).unwrap();
    let run = engine
        .run(QUERY, &["site:linkedin.com".to_string()], Some(1))
        .await
        .unwrap();

    assert_eq!(run.query, QUERY);
    assert_eq!(run.stats.dorks_processed, 1);
    assert_eq!(run.stats.total_search_results, 3);
    assert_eq!(run.stats.total_crawled, 3);
    assert_eq!(run.stats.successful_crawls, run.stats.total_crawled);
    assert_eq!(run.stats.failed_crawls, 0);
    assert_eq!(run.stats.unique_domains, 1);
    assert_eq!(
        run.combined.text.matches("[site:linkedin.com] ===").count(),
        3
    );

    let outcome = &run.dork_results[0];
    assert_eq!(
        outcome.summary,
        "Dork \"site:linkedin.com\": found 3 search results, crawled 3 pages."
    );
    assert_eq!(outcome.search_results[0].position, 1);
    assert_eq!(outcome.search_results[0].dork_used, "site:linkedin.com");

    let acme = outcome
        .crawl_results
        .iter()
        .find(|r| r.url.ends_with("/acme"))
        .unwrap();
    assert_eq!(acme.title, "acme");
    assert_eq!(acme.domain, "127.0.0.1");
    assert_eq!(acme.batch_id, "batch-1");
    assert!(acme
        .content
        .business_info
        .contains(&"Contact us: hello@acme.test".to_string()));
    assert_eq!(
        acme.content.social_links,
        vec!["LinkedIn: https://www.linkedin.com/company/acme"]
    );
}

#[tokio::test]
async fn test_blocked_search_yields_zero_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let engine = Engine::new(create_test_config(&server)).unwrap();
    let run = engine
        .run(QUERY, &["site:example-blocked.com".to_string()], Some(1))
        .await
        .unwrap();

    let outcome = &run.dork_results[0];
    assert_eq!(outcome.total_results, 0);
    assert_eq!(outcome.successful_crawls, 0);
    assert!(outcome.summary.contains("found 0 search results."));
    assert_eq!(run.stats.zero_result_dorks, vec!["site:example-blocked.com"]);
}

#[tokio::test]
async fn test_captcha_page_yields_zero_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><body><p>Our systems have detected unusual traffic from your computer network.</p></body></html>",
        ))
        .mount(&server)
        .await;

    let engine = Engine::new(create_test_config(&server)).unwrap();
    let run = engine
        .run(QUERY, &["inurl:contact".to_string()], Some(1))
        .await
        .unwrap();
    assert_eq!(run.dork_results[0].total_results, 0);
    assert!(run.combined.text.is_empty());
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let server = MockServer::start().await;
    let link = target(&server, "flaky");
    mount_search(&server, &format!("{} intitle:agency", QUERY), &[link]).await;

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_page(&server, "flaky", agency_page("flaky")).await;

    let mut config = create_test_config(&server);
    config.engine.max_retries = 2;
    let engine = Engine::new(config).unwrap();
    let run = engine
        .run(QUERY, &["intitle:agency".to_string()], Some(1))
        .await
        .unwrap();

    let result = &run.dork_results[0].crawl_results[0];
    assert!(result.success);
    assert_eq!(result.attempts, 3);
    assert_eq!(run.stats.failed_crawls, 0);
}

#[tokio::test]
async fn test_retries_are_bounded_for_dead_pages() {
    let server = MockServer::start().await;
    let link = target(&server, "dead");
    mount_search(&server, &format!("{} intitle:agency", QUERY), &[link]).await;

    Mock::given(method("GET"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let engine = Engine::new(create_test_config(&server)).unwrap();
    let run = engine
        .run(QUERY, &["intitle:agency".to_string()], Some(1))
        .await
        .unwrap();

    let result = &run.dork_results[0].crawl_results[0];
    assert!(!result.success);
    assert_eq!(result.attempts, 3);
    assert!(result.content.is_empty());
    assert!(result.error.as_deref().unwrap().contains("503"));
    assert_eq!(
        run.stats.successful_crawls + run.stats.failed_crawls,
        run.stats.total_crawled
    );
}

#[tokio::test]
async fn test_twenty_urls_make_three_batches() {
    let server = MockServer::start().await;
    let pages: Vec<String> = (0..20).map(|i| format!("lead{}", i)).collect();
    let links: Vec<String> = pages.iter().map(|p| target(&server, p)).collect();

    mount_search(&server, &format!("{} inurl:about", QUERY), &links).await;
    for page in &pages {
        mount_page(&server, page, agency_page(page)).await;
    }

    let mut config = create_test_config(&server);
    config.engine.batch_size = 8;
    let engine = Engine::new(config).unwrap();
    let run = engine
        .run(QUERY, &["inurl:about".to_string()], Some(1))
        .await
        .unwrap();

    let batches = &run.dork_results[0].batches;
    assert_eq!(
        batches.iter().map(|b| b.urls.len()).collect::<Vec<_>>(),
        vec![8, 8, 4]
    );
    assert_eq!(
        batches.iter().map(|b| b.batch_id.as_str()).collect::<Vec<_>>(),
        vec!["batch-1", "batch-2", "batch-3"]
    );
    let replayed: Vec<String> = batches.iter().flat_map(|b| b.urls.clone()).collect();
    assert_eq!(replayed, links);
    assert_eq!(run.stats.total_batches, 3);
    assert_eq!(run.stats.successful_crawls, 20);
}

#[tokio::test]
async fn test_dork_results_follow_input_order() {
    let server = MockServer::start().await;
    mount_search(
        &server,
        &format!("{} site:one.test", QUERY),
        &[target(&server, "one")],
    )
    .await;
    mount_search(
        &server,
        &format!("{} site:two.test", QUERY),
        &[target(&server, "one"), target(&server, "two")],
    )
    .await;
    mount_page(&server, "one", agency_page("one")).await;
    mount_page(&server, "two", agency_page("two")).await;

    let dorks = vec![
        "site:two.test".to_string(),
        "site:missing.test".to_string(),
        "site:one.test".to_string(),
    ];
    let engine = Engine::new(create_test_config(&server)).unwrap();
    let run = engine.run(QUERY, &dorks, Some(1)).await.unwrap();

    assert_eq!(run.dork_results.len(), dorks.len());
    let order: Vec<&str> = run.dork_results.iter().map(|o| o.dork.as_str()).collect();
    assert_eq!(order, vec!["site:two.test", "site:missing.test", "site:one.test"]);

    // the same URL is crawled again for a later dork
    assert_eq!(run.stats.total_crawled, 3);
    assert_eq!(run.stats.zero_result_dorks, vec!["site:missing.test"]);
    assert!(run.summary.contains("processed 3 dork(s)"));
}
