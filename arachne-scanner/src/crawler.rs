use crate::categorize::{CategoryContext, Categorizer};
use crate::error::Result;
use crate::event::{StatusEvent, StatusReporter};
use crate::fetch::{Fetcher, Page};
use crate::frontier::{Pushed, Strategy};
use crate::node::{UrlNode, normalize_url};
use crate::result::{CrawlResult, CrawlSummary, FinishReason};
use crate::score::{LinkLengthScorer, ScoreInput, Scorer};
use crate::state::{CancelHandle, CrawlPhase, CrawlState, StartCommand};
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// The crawl engine. One `Crawler` can drive any number of runs, each with
/// its own `CrawlState`.
pub struct Crawler<F> {
    fetcher: F,
    categorizer: Categorizer,
    scorer: Arc<dyn Scorer>,
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            categorizer: Categorizer::new(),
            scorer: Arc::new(LinkLengthScorer),
        }
    }

    pub fn with_categorizer(mut self, categorizer: Categorizer) -> Self {
        self.categorizer = categorizer;
        self
    }

    /// Heuristic used by best-first runs.
    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Builds the state for a run without starting it.
    pub fn prepare(&self, command: &StartCommand, cancel: CancelHandle) -> Result<CrawlState> {
        CrawlState::new(command, self.scorer.order(), cancel)
    }

    /// Validates `command` and runs it to completion.
    ///
    /// A configuration error still produces `Error` and `Finished{Failed}`
    /// events before it is returned.
    pub async fn crawl(
        &self,
        command: &StartCommand,
        cancel: CancelHandle,
        reporter: &StatusReporter,
    ) -> Result<CrawlSummary> {
        let state = match self.prepare(command, cancel) {
            Ok(state) => state,
            Err(e) => {
                warn!("Refusing to crawl {}: {}", command.seed, e);
                reporter.emit(StatusEvent::Error {
                    url: command.seed.clone(),
                    message: e.to_string(),
                });
                reporter.emit(StatusEvent::Finished {
                    reason: FinishReason::Failed,
                    total_visited: 0,
                    max_depth_reached: 0,
                    visited: Vec::new(),
                });
                return Err(e);
            }
        };

        Ok(self.run(state, reporter).await)
    }

    /// Drives a prepared state until the frontier is exhausted, a limit is
    /// hit, or the run is cancelled.
    pub async fn run(&self, mut state: CrawlState, reporter: &StatusReporter) -> CrawlSummary {
        info!(
            "Starting {} crawl of {} (run {})",
            state.strategy, state.seed.url, state.run_id
        );

        state.phase = CrawlPhase::Running;
        state.push_seed();

        let reason = loop {
            if state.cancel.is_cancelled() {
                info!("Crawl of {} cancelled", state.seed.url);
                break FinishReason::Cancelled;
            }

            if state.node_limit_reached() {
                debug!("Node limit reached after {} visits", state.nodes_visited);
                break FinishReason::Completed;
            }

            let Some(node) = state.frontier.pop() else {
                if state.frontier.next_pass() {
                    state.registry.reset_pass();
                    state.pass += 1;
                    debug!(
                        "Starting pass {} with depth bound {:?}",
                        state.pass,
                        state.frontier.depth_bound()
                    );
                    state.push_seed();
                    continue;
                }
                break FinishReason::Completed;
            };

            self.visit(&mut state, node, reporter).await;
        };

        state.phase = reason.into();
        info!(
            "Crawl of {} finished ({:?}). Visited {} pages, max depth {}",
            state.seed.url, reason, state.nodes_visited, state.max_depth_reached
        );

        reporter.emit(StatusEvent::Finished {
            reason,
            total_visited: state.nodes_visited,
            max_depth_reached: state.max_depth_reached,
            visited: state.visited.clone(),
        });

        state.into_summary(reason)
    }

    async fn visit(&self, state: &mut CrawlState, node: UrlNode, reporter: &StatusReporter) {
        state.registry.mark_visited(&node.url);
        state.nodes_visited += 1;
        state.visited.push(node.url.clone());
        state.max_depth_reached = state.max_depth_reached.max(node.depth);

        match self.fetcher.fetch(&node.url).await {
            Ok(page) => {
                let result = self.expand(state, &node, &page);
                reporter.emit(StatusEvent::NodeVisited {
                    url: node.url.clone(),
                    depth: node.depth,
                    categorized_links: result.links.clone(),
                });
                state.results.push(result);
            }
            Err(e) => {
                warn!("Crawl error for {}: {}", node.url, e);
                reporter.emit(StatusEvent::Error {
                    url: node.url.clone(),
                    message: e.to_string(),
                });
                state.results.push(CrawlResult::with_error(
                    node.url,
                    node.depth,
                    state.pass,
                    e.to_string(),
                ));
            }
        }
    }

    /// Categorizes every link on `page` and queues the ones worth following.
    fn expand(&self, state: &mut CrawlState, node: &UrlNode, page: &Page) -> CrawlResult {
        let mut result = CrawlResult::new(node.url.clone(), node.depth, state.pass);

        let Ok(base) = Url::parse(&page.url).or_else(|_| Url::parse(&node.url)) else {
            return result;
        };
        let child_depth = node.depth + 1;

        for link in &page.links {
            let ctx = CategoryContext {
                base: &base,
                seed_domain: &state.seed_domain,
                link: &link.context,
            };
            let classified = self.categorizer.classify(&link.href, &ctx);
            let category = classified.category;
            let entry = classified
                .resolved
                .as_ref()
                .map(normalize_url)
                .unwrap_or_else(|| link.href.trim().to_string());

            // Repeats of a link on the same page keep their first category
            if !result.links.insert(category, entry.clone()) {
                continue;
            }

            if !state.follow.contains(&category) {
                continue;
            }
            let Some(resolved) = &classified.resolved else {
                continue;
            };
            if !matches!(resolved.scheme(), "http" | "https") {
                continue;
            }
            if !state.depth_allowed(child_depth) || state.node_limit_reached() {
                continue;
            }
            if state.registry.is_known(&entry) {
                continue;
            }

            let score = if state.strategy == Strategy::BestFirst {
                self.scorer.score(&ScoreInput {
                    url: &entry,
                    category,
                    anchor_text: link.context.anchor_text.as_deref(),
                    depth: child_depth,
                    parent_content: &page.content,
                })
            } else {
                0.0
            };

            let discovery = state.registry.discover(&entry, child_depth);
            match state
                .frontier
                .push(node.child(entry.clone(), discovery.order, score))
            {
                Pushed::Queued => {
                    state.registry.mark_enqueued(&entry, child_depth);
                    debug!("  -> Queued {} (depth {})", entry, child_depth);
                }
                Pushed::Deferred => {
                    debug!("  -> Deferred {} to the next pass", entry);
                }
            }
        }

        result
    }
}
