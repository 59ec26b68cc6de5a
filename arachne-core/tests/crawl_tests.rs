// Tests for crawl orchestration

use arachne_core::crawl::{
    CrawlEventCallback, CrawlOptions, build_scorer, execute_crawl, extract_url_path,
    start_command,
};
use arachne_scanner::score::{ScoreInput, ScoreOrder};
use arachne_scanner::{CancelHandle, FinishReason, LinkCategory, StatusEvent, Strategy};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// URL Path Extraction Tests
// ============================================================================

#[test]
fn test_extract_url_path_root() {
    assert_eq!(extract_url_path("http://example.com/"), "/");
    assert_eq!(extract_url_path("http://example.com"), "/");
}

#[test]
fn test_extract_url_path_nested() {
    assert_eq!(extract_url_path("http://example.com/api/v1/users"), "/api/v1/users");
}

#[test]
fn test_extract_url_path_drops_query_and_fragment() {
    assert_eq!(extract_url_path("http://example.com/api?key=value#top"), "/api");
}

#[test]
fn test_extract_url_path_invalid_url() {
    let url = "not a valid url";
    // Should return original string for invalid URLs
    assert_eq!(extract_url_path(url), url);
}

// ============================================================================
// Option Mapping Tests
// ============================================================================

#[test]
fn test_default_options() {
    let options = CrawlOptions::default();
    assert_eq!(options.strategy, Strategy::Bfs);
    assert_eq!(options.max_depth, Some(3));
    assert_eq!(options.timeout_secs, 10);
    assert!(options.categories.is_none());
}

#[test]
fn test_start_command_carries_options() {
    let options = CrawlOptions {
        strategy: Strategy::IterativeDeepening,
        max_nodes: Some(7),
        max_depth: Some(2),
        categories: Some(vec![LinkCategory::InternalPage, LinkCategory::Document]),
        ..CrawlOptions::default()
    };

    let command = start_command(&options, "http://example.com/");
    assert_eq!(command.seed, "http://example.com/");
    assert_eq!(command.strategy, Strategy::IterativeDeepening);
    assert_eq!(command.max_nodes, Some(7));
    assert_eq!(command.max_depth, Some(2));

    let filter = command.category_filter.unwrap();
    assert_eq!(filter.len(), 2);
    assert!(filter.contains(&LinkCategory::Document));
}

#[test]
fn test_build_scorer_uses_keywords_when_given() {
    let input = ScoreInput {
        url: "http://example.com/rust",
        category: LinkCategory::InternalPage,
        anchor_text: Some("rust rust"),
        depth: 1,
        parent_content: "",
    };

    let keyword = build_scorer(&["rust".to_string()]);
    assert_eq!(keyword.order(), ScoreOrder::HighestFirst);
    assert!(keyword.score(&input) > 0.0);

    let length = build_scorer(&[]);
    assert_eq!(length.order(), ScoreOrder::LowestFirst);

    let blank = build_scorer(&["  ".to_string()]);
    assert_eq!(blank.order(), ScoreOrder::LowestFirst);
}

// ============================================================================
// Execution Tests
// ============================================================================

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html",
    )
}

async fn site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/a">A</a><a href="/b">B</a><img src="/logo.png">"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<a href="/">home</a><a href="/report.pdf">pdf</a>"#))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("no links here"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_execute_crawl_visits_site() {
    let server = site().await;

    let options = CrawlOptions {
        urls: vec![server.uri()],
        ..CrawlOptions::default()
    };

    let summaries = execute_crawl(options, CancelHandle::new(), None, None)
        .await
        .unwrap();

    assert_eq!(summaries.len(), 1);
    let summary = &summaries[0];
    assert_eq!(summary.reason, FinishReason::Completed);
    assert_eq!(summary.total_visited, 3);
    assert_eq!(summary.max_depth_reached, 1);
    assert_eq!(summary.links_in(LinkCategory::Image), 1);
    assert_eq!(summary.links_in(LinkCategory::Document), 1);
    assert_eq!(summary.error_count(), 0);
}

#[tokio::test]
async fn test_execute_crawl_runs_each_seed_independently() {
    let first = site().await;
    let second = site().await;

    let seen: Arc<Mutex<Vec<(String, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let events: CrawlEventCallback = Arc::new(move |seed: &str, event: &StatusEvent| {
        if let StatusEvent::Finished { .. } = event {
            seen_clone
                .lock()
                .unwrap()
                .push((seed.to_string(), "finished".to_string()));
        }
    });

    let options = CrawlOptions {
        urls: vec![first.uri(), second.uri()],
        strategy: Strategy::Dfs,
        ..CrawlOptions::default()
    };

    let summaries = execute_crawl(options, CancelHandle::new(), None, Some(events))
        .await
        .unwrap();

    assert_eq!(summaries.len(), 2);
    assert_ne!(summaries[0].run_id, summaries[1].run_id);
    for summary in &summaries {
        assert_eq!(summary.total_visited, 3);
        assert_eq!(summary.strategy, Strategy::Dfs);
    }

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().any(|(seed, _)| seed == &first.uri()));
    assert!(seen.iter().any(|(seed, _)| seed == &second.uri()));
}

#[tokio::test]
async fn test_execute_crawl_reports_bad_seed_and_keeps_others() {
    let server = site().await;

    let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let messages_clone = messages.clone();
    let progress = Arc::new(move |msg: String| {
        messages_clone.lock().unwrap().push(msg);
    });

    let options = CrawlOptions {
        urls: vec!["ftp://nowhere.invalid/".to_string(), server.uri()],
        ..CrawlOptions::default()
    };

    let summaries = execute_crawl(options, CancelHandle::new(), Some(progress), None)
        .await
        .unwrap();

    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].total_visited, 3);

    let messages = messages.lock().unwrap();
    assert!(messages.iter().any(|m| m.contains("Failed to crawl ftp://nowhere.invalid/")));
}

#[tokio::test]
async fn test_execute_crawl_fails_when_nothing_runs() {
    let options = CrawlOptions {
        urls: vec!["not a url".to_string()],
        ..CrawlOptions::default()
    };
    let result = execute_crawl(options, CancelHandle::new(), None, None).await;
    assert!(result.is_err());

    let result = execute_crawl(CrawlOptions::default(), CancelHandle::new(), None, None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_execute_crawl_cancelled_before_start() {
    let server = site().await;
    let cancel = CancelHandle::new();
    cancel.cancel();

    let options = CrawlOptions {
        urls: vec![server.uri()],
        ..CrawlOptions::default()
    };

    let summaries = execute_crawl(options, cancel, None, None).await.unwrap();
    assert_eq!(summaries[0].reason, FinishReason::Cancelled);
    assert_eq!(summaries[0].total_visited, 0);
}

#[tokio::test]
async fn test_execute_crawl_records_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/missing">gone</a>"#))
        .mount(&server)
        .await;

    let options = CrawlOptions {
        urls: vec![server.uri()],
        ..CrawlOptions::default()
    };

    let summaries = execute_crawl(options, CancelHandle::new(), None, None)
        .await
        .unwrap();

    let summary = &summaries[0];
    assert_eq!(summary.reason, FinishReason::Completed);
    assert_eq!(summary.total_visited, 2);
    assert_eq!(summary.error_count(), 1);
    let failed = summary.results.iter().find(|r| r.is_error()).unwrap();
    assert!(failed.url.ends_with("/missing"));
    assert!(failed.error.as_deref().unwrap().contains("404"));
}
