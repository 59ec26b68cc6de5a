use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// First time a URL was seen during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    pub order: u64,
    pub depth: usize,
}

/// Tracks which URLs are known within the current pass, plus statistics that
/// survive pass resets.
#[derive(Debug, Default)]
pub struct VisitedRegistry {
    in_pass: HashSet<String>,
    discoveries: HashMap<String, Discovery>,
    unique_visited: HashSet<String>,
    total_visits: usize,
    passes: usize,
    next_order: u64,
}

impl VisitedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_known(&self, url: &str) -> bool {
        self.in_pass.contains(url)
    }

    /// Records the first sighting of `url` and returns it. Later calls
    /// return the original record unchanged. Does not touch pass membership.
    pub fn discover(&mut self, url: &str, depth: usize) -> Discovery {
        let next_order = &mut self.next_order;
        *self
            .discoveries
            .entry(url.to_string())
            .or_insert_with(|| {
                let discovery = Discovery {
                    order: *next_order,
                    depth,
                };
                *next_order += 1;
                discovery
            })
    }

    /// Marks `url` as queued for this pass. Returns the URL's first
    /// discovery record.
    pub fn mark_enqueued(&mut self, url: &str, depth: usize) -> Discovery {
        self.in_pass.insert(url.to_string());
        self.discover(url, depth)
    }

    pub fn mark_visited(&mut self, url: &str) {
        self.in_pass.insert(url.to_string());
        self.unique_visited.insert(url.to_string());
        self.total_visits += 1;
    }

    /// Forgets within-pass membership so the next pass may revisit pages.
    pub fn reset_pass(&mut self) {
        self.in_pass.clear();
        self.passes += 1;
    }

    pub fn discovery(&self, url: &str) -> Option<Discovery> {
        self.discoveries.get(url).copied()
    }

    pub fn discovered_count(&self) -> usize {
        self.discoveries.len()
    }

    pub fn unique_visited(&self) -> usize {
        self.unique_visited.len()
    }

    pub fn total_visits(&self) -> usize {
        self.total_visits
    }

    /// Number of completed pass resets.
    pub fn passes(&self) -> usize {
        self.passes
    }
}
