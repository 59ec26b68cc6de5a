// Tests for report generation functionality

use arachne_core::report::{
    LinkRank, ReportFormat, generate_crawl_report, generate_json_report, rank_links,
    render_report, save_report,
};
use arachne_scanner::result::CrawlResult;
use arachne_scanner::{CrawlSummary, FinishReason, LinkCategory, Strategy};
use uuid::Uuid;

fn page(url: &str, depth: usize, links: &[(LinkCategory, &str)]) -> CrawlResult {
    let mut result = CrawlResult::new(url.to_string(), depth, 0);
    for (category, link) in links {
        result.links.insert(*category, link.to_string());
    }
    result
}

fn sample_summary() -> CrawlSummary {
    let results = vec![
        page(
            "http://example.com/",
            0,
            &[
                (LinkCategory::InternalPage, "http://example.com/a"),
                (LinkCategory::InternalPage, "http://example.com/b"),
                (LinkCategory::Image, "http://example.com/logo.png"),
            ],
        ),
        page(
            "http://example.com/a",
            1,
            &[
                (LinkCategory::InternalPage, "http://example.com/b"),
                (LinkCategory::ExternalPage, "https://other.org"),
                (LinkCategory::Image, "http://example.com/logo.png"),
            ],
        ),
        CrawlResult::with_error(
            "http://example.com/b".to_string(),
            1,
            0,
            "Network error: HTTP 500".to_string(),
        ),
    ];

    CrawlSummary {
        run_id: Uuid::new_v4(),
        seed: "http://example.com/".to_string(),
        strategy: Strategy::Bfs,
        reason: FinishReason::Completed,
        total_visited: 3,
        max_depth_reached: 1,
        passes: 1,
        visited: results.iter().map(|r| r.url.clone()).collect(),
        results,
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("txt"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("TEXT"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("Json"), Some(ReportFormat::Json));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert!(ReportFormat::from_str("csv").is_none());
    assert!(ReportFormat::from_str("").is_none());
}

// ============================================================================
// Link Ranking Tests
// ============================================================================

#[test]
fn test_rank_links_counts_referencing_pages() {
    let ranked = rank_links(&[sample_summary()]);

    assert_eq!(ranked.len(), 4);
    assert_eq!(
        ranked[0],
        LinkRank {
            url: "http://example.com/b".to_string(),
            references: 2,
        }
    );
    assert_eq!(ranked[1].url, "http://example.com/logo.png");
    assert_eq!(ranked[1].references, 2);
    assert_eq!(ranked[2].references, 1);
}

#[test]
fn test_rank_links_ties_sorted_by_url() {
    let ranked = rank_links(&[sample_summary()]);
    let singles: Vec<&str> = ranked
        .iter()
        .filter(|r| r.references == 1)
        .map(|r| r.url.as_str())
        .collect();
    assert_eq!(singles, vec!["http://example.com/a", "https://other.org"]);
}

#[test]
fn test_rank_links_across_runs() {
    let ranked = rank_links(&[sample_summary(), sample_summary()]);
    assert_eq!(ranked[0].references, 4);
}

#[test]
fn test_rank_links_empty() {
    assert!(rank_links(&[]).is_empty());
}

// ============================================================================
// Text Report Tests
// ============================================================================

#[test]
fn test_text_report_summary() {
    let report = generate_crawl_report(&[sample_summary()], 0);

    assert!(report.contains("Runs: 1"));
    assert!(report.contains("Pages visited: 3"));
    assert!(report.contains("Fetch errors: 1"));
    assert!(report.contains("internal-page: 3"));
    assert!(report.contains("image: 2"));
    assert!(report.contains("external-page: 1"));
    assert!(report.contains("document: 0"));
}

#[test]
fn test_text_report_lists_pages() {
    let report = generate_crawl_report(&[sample_summary()], 0);

    assert!(report.contains("http://example.com/"));
    assert!(report.contains("/a"));
    assert!(report.contains("HTTP 500"));
    assert!(!report.contains("Most referenced links"));
}

#[test]
fn test_text_report_top_links() {
    let report = generate_crawl_report(&[sample_summary()], 1);

    assert!(report.contains("Most referenced links"));
    assert!(report.contains("http://example.com/b"));
    assert!(!report.contains("https://other.org"));
}

// ============================================================================
// JSON Report Tests
// ============================================================================

#[test]
fn test_json_report_structure() {
    let json = generate_json_report(&[sample_summary()], 2).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let report = &value["report"];
    assert_eq!(report["metadata"]["generator"], "Arachne");
    assert_eq!(report["summary"]["runs"], 1);
    assert_eq!(report["summary"]["pages_visited"], 3);
    assert_eq!(report["summary"]["fetch_errors"], 1);
    assert_eq!(report["summary"]["links_by_category"]["internal-page"], 3);
    assert_eq!(report["top_links"].as_array().unwrap().len(), 2);

    let run = &report["runs"][0];
    assert_eq!(run["strategy"], "bfs");
    assert_eq!(run["reason"], "Completed");
    assert_eq!(run["results"][0]["links"]["image"][0], "http://example.com/logo.png");
}

#[test]
fn test_render_report_dispatches_on_format() {
    let summaries = [sample_summary()];

    let text = render_report(&summaries, ReportFormat::Text, 0).unwrap();
    assert!(text.contains("# Summary:"));

    let json = render_report(&summaries, ReportFormat::Json, 0).unwrap();
    assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());
}

#[test]
fn test_save_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.txt");

    save_report("hello", &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
}
