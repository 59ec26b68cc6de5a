use crate::categorize::{LinkCategory, registered_domain};
use crate::error::{CrawlError, Result};
use crate::frontier::{Frontier, Strategy};
use crate::node::{UrlNode, normalize_url};
use crate::result::{CrawlResult, CrawlSummary, FinishReason};
use crate::score::ScoreOrder;
use crate::visited::VisitedRegistry;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;
use uuid::Uuid;

/// Everything needed to begin a crawl.
#[derive(Debug, Clone)]
pub struct StartCommand {
    pub seed: String,
    pub strategy: Strategy,
    pub max_nodes: Option<usize>,
    pub max_depth: Option<usize>,
    /// Categories whose links are followed. `None` follows internal pages only.
    pub category_filter: Option<HashSet<LinkCategory>>,
}

impl StartCommand {
    pub fn new(seed: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            seed: seed.into(),
            strategy,
            max_nodes: None,
            max_depth: None,
            category_filter: None,
        }
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_category_filter<I>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = LinkCategory>,
    {
        self.category_filter = Some(categories.into_iter().collect());
        self
    }
}

/// Cooperative stop signal for one or more runs. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent; has no effect on runs that already finished.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl CrawlPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CrawlPhase::Completed | CrawlPhase::Cancelled | CrawlPhase::Failed
        )
    }
}

impl From<FinishReason> for CrawlPhase {
    fn from(reason: FinishReason) -> Self {
        match reason {
            FinishReason::Completed => CrawlPhase::Completed,
            FinishReason::Cancelled => CrawlPhase::Cancelled,
            FinishReason::Failed => CrawlPhase::Failed,
        }
    }
}

/// All mutable state of a single crawl run. Owned by the engine for the
/// duration of the run and never shared between runs.
pub struct CrawlState {
    pub(crate) run_id: Uuid,
    pub(crate) seed: UrlNode,
    pub(crate) seed_domain: String,
    pub(crate) strategy: Strategy,
    pub(crate) max_nodes: Option<usize>,
    pub(crate) max_depth: Option<usize>,
    pub(crate) follow: HashSet<LinkCategory>,
    pub(crate) frontier: Box<dyn Frontier>,
    pub(crate) registry: VisitedRegistry,
    pub(crate) results: Vec<CrawlResult>,
    pub(crate) visited: Vec<String>,
    pub(crate) nodes_visited: usize,
    pub(crate) max_depth_reached: usize,
    pub(crate) pass: usize,
    pub(crate) phase: CrawlPhase,
    pub(crate) cancel: CancelHandle,
}

impl CrawlState {
    /// Validates the command. Any error here is a configuration error and
    /// no fetch will happen.
    pub fn new(command: &StartCommand, order: ScoreOrder, cancel: CancelHandle) -> Result<Self> {
        let seed_url = Url::parse(command.seed.trim())
            .map_err(|e| CrawlError::InvalidSeed(format!("{}: {}", command.seed, e)))?;
        if !matches!(seed_url.scheme(), "http" | "https") {
            return Err(CrawlError::InvalidSeed(format!(
                "{}: only http and https are supported",
                command.seed
            )));
        }
        let host = seed_url
            .host_str()
            .ok_or_else(|| CrawlError::InvalidSeed(format!("{}: no host", command.seed)))?;

        if command.max_nodes == Some(0) {
            return Err(CrawlError::InvalidLimit(
                "max nodes must be a positive integer".to_string(),
            ));
        }

        let follow = match &command.category_filter {
            Some(filter) if filter.is_empty() => return Err(CrawlError::EmptyCategoryFilter),
            Some(filter) => filter.clone(),
            None => HashSet::from([LinkCategory::InternalPage]),
        };

        Ok(Self {
            run_id: Uuid::new_v4(),
            seed: UrlNode::seed(normalize_url(&seed_url)),
            seed_domain: registered_domain(host).to_lowercase(),
            strategy: command.strategy,
            max_nodes: command.max_nodes,
            max_depth: command.max_depth,
            follow,
            frontier: command.strategy.frontier(order),
            registry: VisitedRegistry::new(),
            results: Vec::new(),
            visited: Vec::new(),
            nodes_visited: 0,
            max_depth_reached: 0,
            pass: 0,
            phase: CrawlPhase::Idle,
            cancel,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn seed(&self) -> &str {
        &self.seed.url
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn nodes_visited(&self) -> usize {
        self.nodes_visited
    }

    pub fn results(&self) -> &[CrawlResult] {
        &self.results
    }

    pub fn registry(&self) -> &VisitedRegistry {
        &self.registry
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub(crate) fn node_limit_reached(&self) -> bool {
        self.max_nodes.is_some_and(|max| self.nodes_visited >= max)
    }

    pub(crate) fn depth_allowed(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth <= max)
    }

    /// Queues the seed, starting a pass.
    pub(crate) fn push_seed(&mut self) {
        let seed = self.seed.clone();
        self.registry.mark_enqueued(&seed.url, 0);
        self.frontier.push(seed);
    }

    pub(crate) fn into_summary(self, reason: FinishReason) -> CrawlSummary {
        CrawlSummary {
            run_id: self.run_id,
            seed: self.seed.url,
            strategy: self.strategy,
            reason,
            total_visited: self.nodes_visited,
            max_depth_reached: self.max_depth_reached,
            passes: self.pass + 1,
            visited: self.visited,
            results: self.results,
        }
    }
}
