// Report generation from crawl summaries

use crate::crawl::extract_url_path;
use arachne_scanner::{CrawlSummary, FinishReason, LinkCategory};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// How often a URL was referenced across every page of every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRank {
    pub url: String,
    pub references: usize,
}

/// Counts references to each link across all results. A link counts once per
/// page that mentions it. Sorted by count descending, then URL.
pub fn rank_links(summaries: &[CrawlSummary]) -> Vec<LinkRank> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for result in summaries.iter().flat_map(|s| &s.results) {
        for (_, links) in result.links.iter() {
            for link in links {
                *counts.entry(link.as_str()).or_default() += 1;
            }
        }
    }

    let mut ranked: Vec<LinkRank> = counts
        .into_iter()
        .map(|(url, references)| LinkRank {
            url: url.to_string(),
            references,
        })
        .collect();
    ranked.sort_by(|a, b| b.references.cmp(&a.references).then_with(|| a.url.cmp(&b.url)));
    ranked
}

fn category_totals(summaries: &[CrawlSummary]) -> Vec<(LinkCategory, usize)> {
    LinkCategory::ALL
        .iter()
        .map(|&category| {
            let total = summaries.iter().map(|s| s.links_in(category)).sum();
            (category, total)
        })
        .collect()
}

fn reason_label(reason: FinishReason) -> String {
    match reason {
        FinishReason::Completed => "completed".green().to_string(),
        FinishReason::Cancelled => "cancelled".yellow().to_string(),
        FinishReason::Failed => "failed".red().to_string(),
    }
}

pub fn generate_crawl_report(summaries: &[CrawlSummary], top: usize) -> String {
    let mut report = String::new();
    report.push_str(RULE);
    report.push_str("\n\n# Summary:\n");
    report.push_str(&format!("  Runs: {}\n", summaries.len()));

    let visited: usize = summaries.iter().map(|s| s.total_visited).sum();
    report.push_str(&format!("  Pages visited: {}\n", visited));

    let errors: usize = summaries.iter().map(|s| s.error_count()).sum();
    report.push_str(&format!("  Fetch errors: {}\n", errors));

    report.push_str("  Links found:\n");
    for (category, total) in category_totals(summaries) {
        report.push_str(&format!("    {}: {}\n", category, total));
    }

    report.push('\n');
    report.push_str(RULE);
    report.push_str("\n\n");

    for summary in summaries {
        report.push_str(&format!(
            "## {} ({}, {})\n",
            summary.seed,
            summary.strategy,
            reason_label(summary.reason)
        ));
        report.push_str(&format!(
            "  {} pages visited, max depth {}, {} pass(es)\n\n",
            summary.total_visited, summary.max_depth_reached, summary.passes
        ));

        for result in &summary.results {
            let path = extract_url_path(&result.url);
            let marker = if result.is_error() {
                "✗".red()
            } else {
                "✓".green()
            };

            let mut line = format!("  {} [d{}] {}", marker, result.depth, path);
            if summary.passes > 1 {
                line.push_str(&format!(" (pass {})", result.pass + 1));
            }

            if let Some(ref error) = result.error {
                line.push_str(&format!(" {}", error.bright_black()));
            } else if !result.links.is_empty() {
                let counts: Vec<String> = result
                    .links
                    .iter()
                    .map(|(category, links)| format!("{} {}", links.len(), category))
                    .collect();
                line.push_str(&format!(" {}", counts.join(", ").bright_black()));
            }

            report.push_str(&line);
            report.push('\n');
        }
        report.push('\n');
    }

    if top > 0 {
        let ranked = rank_links(summaries);
        if !ranked.is_empty() {
            report.push_str(RULE);
            report.push_str("\n\n# Most referenced links:\n");
            for rank in ranked.iter().take(top) {
                report.push_str(&format!("  {:>4}  {}\n", rank.references, rank.url));
            }
            report.push('\n');
        }
    }

    report
}

pub fn generate_json_report(summaries: &[CrawlSummary], top: usize) -> Result<String, serde_json::Error> {
    let totals: serde_json::Map<String, serde_json::Value> = category_totals(summaries)
        .into_iter()
        .map(|(category, total)| (category.to_string(), serde_json::json!(total)))
        .collect();

    let ranked: Vec<LinkRank> = rank_links(summaries).into_iter().take(top).collect();

    let json_report = serde_json::json!({
        "report": {
            "metadata": {
                "generator": "Arachne",
                "version": env!("CARGO_PKG_VERSION"),
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "format": "json"
            },
            "summary": {
                "runs": summaries.len(),
                "pages_visited": summaries.iter().map(|s| s.total_visited).sum::<usize>(),
                "fetch_errors": summaries.iter().map(|s| s.error_count()).sum::<usize>(),
                "links_by_category": totals
            },
            "top_links": ranked,
            "runs": summaries
        }
    });

    serde_json::to_string_pretty(&json_report)
}

/// Renders `summaries` in the requested format.
pub fn render_report(
    summaries: &[CrawlSummary],
    format: ReportFormat,
    top: usize,
) -> Result<String, serde_json::Error> {
    match format {
        ReportFormat::Text => Ok(generate_crawl_report(summaries, top)),
        ReportFormat::Json => generate_json_report(summaries, top),
    }
}

pub fn save_report(content: &str, path: &Path) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
