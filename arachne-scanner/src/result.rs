use crate::categorize::LinkCategory;
use crate::frontier::Strategy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Links found on one page, bucketed by category. Each bucket keeps
/// discovery order and holds a link at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorizedLinks(BTreeMap<LinkCategory, Vec<String>>);

impl CategorizedLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `link` under `category`. A link lives in exactly one bucket:
    /// returns false, leaving the first category in place, when the link is
    /// already recorded anywhere.
    pub fn insert(&mut self, category: LinkCategory, link: String) -> bool {
        if self.category_of(&link).is_some() {
            return false;
        }
        self.0.entry(category).or_default().push(link);
        true
    }

    pub fn category_of(&self, link: &str) -> Option<LinkCategory> {
        self.iter()
            .find(|(_, links)| links.iter().any(|l| l == link))
            .map(|(c, _)| c)
    }

    pub fn get(&self, category: LinkCategory) -> &[String] {
        self.0.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (LinkCategory, &[String])> {
        self.0.iter().map(|(c, links)| (*c, links.as_slice()))
    }

    /// Categories whose bucket contains `link`.
    pub fn categories_of(&self, link: &str) -> Vec<LinkCategory> {
        self.iter()
            .filter(|(_, links)| links.iter().any(|l| l == link))
            .map(|(c, _)| c)
            .collect()
    }

    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// What the crawl learned about one visited node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    pub url: String,
    pub depth: usize,
    /// Iterative-deepening pass the visit belongs to; always 0 otherwise.
    pub pass: usize,
    pub links: CategorizedLinks,
    pub error: Option<String>,
}

impl CrawlResult {
    pub fn new(url: String, depth: usize, pass: usize) -> Self {
        Self {
            url,
            depth,
            pass,
            links: CategorizedLinks::new(),
            error: None,
        }
    }

    pub fn with_error(url: String, depth: usize, pass: usize, error: String) -> Self {
        Self {
            url,
            depth,
            pass,
            links: CategorizedLinks::new(),
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Completed,
    Cancelled,
    Failed,
}

/// Everything a finished run hands back to its caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub run_id: Uuid,
    pub seed: String,
    pub strategy: Strategy,
    pub reason: FinishReason,
    pub total_visited: usize,
    pub max_depth_reached: usize,
    pub passes: usize,
    /// Visited URLs in visit order.
    pub visited: Vec<String>,
    pub results: Vec<CrawlResult>,
}

impl CrawlSummary {
    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_error()).count()
    }

    pub fn links_in(&self, category: LinkCategory) -> usize {
        self.results.iter().map(|r| r.links.get(category).len()).sum()
    }
}
