use arachne_scanner::score::KeywordScorer;
use arachne_scanner::{
    CancelHandle, CrawlSummary, Crawler, Fetcher, HttpFetcher, LinkCategory, Scorer, StartCommand,
    StatusEvent, StatusReporter, Strategy,
};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::warn;
use url::Url;

/// Options for configuring a crawl operation
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub urls: Vec<String>,
    pub strategy: Strategy,
    pub max_nodes: Option<usize>,
    pub max_depth: Option<usize>,
    /// Categories to follow; `None` keeps the engine default (internal pages).
    pub categories: Option<Vec<LinkCategory>>,
    /// Non-empty switches best-first scoring to keyword density.
    pub keywords: Vec<String>,
    pub timeout_secs: u64,
    pub show_progress_bars: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            strategy: Strategy::Bfs,
            max_nodes: None,
            max_depth: Some(3),
            categories: None,
            keywords: Vec::new(),
            timeout_secs: 10,
            show_progress_bars: false,
        }
    }
}

/// Callback for reporting crawl progress
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Callback receiving every status event, tagged with the seed of its run
pub type CrawlEventCallback = Arc<dyn Fn(&str, &StatusEvent) + Send + Sync>;

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Picks the best-first heuristic for the given keywords.
pub fn build_scorer(keywords: &[String]) -> Arc<dyn Scorer> {
    if keywords.iter().any(|k| !k.trim().is_empty()) {
        Arc::new(KeywordScorer::new(keywords))
    } else {
        Arc::new(arachne_scanner::score::LinkLengthScorer)
    }
}

/// The start command for one seed under `options`.
pub fn start_command(options: &CrawlOptions, seed: &str) -> StartCommand {
    StartCommand {
        seed: seed.to_string(),
        strategy: options.strategy,
        max_nodes: options.max_nodes,
        max_depth: options.max_depth,
        category_filter: options
            .categories
            .as_ref()
            .map(|c| c.iter().copied().collect()),
    }
}

/// Execute a crawl over HTTP with the given options.
/// Every seed gets its own independent run; all runs share `cancel`.
pub async fn execute_crawl(
    options: CrawlOptions,
    cancel: CancelHandle,
    progress_callback: Option<CrawlProgressCallback>,
    event_callback: Option<CrawlEventCallback>,
) -> Result<Vec<CrawlSummary>, String> {
    let fetcher = HttpFetcher::with_timeout(options.timeout_secs)
        .map_err(|e| format!("Failed to create HTTP client: {}", e))?;

    execute_crawl_with(fetcher, options, cancel, progress_callback, event_callback).await
}

/// Same as [`execute_crawl`] with a caller-supplied fetcher.
pub async fn execute_crawl_with<F: Fetcher>(
    fetcher: F,
    options: CrawlOptions,
    cancel: CancelHandle,
    progress_callback: Option<CrawlProgressCallback>,
    event_callback: Option<CrawlEventCallback>,
) -> Result<Vec<CrawlSummary>, String> {
    if options.urls.is_empty() {
        return Err("No seed URLs to crawl".to_string());
    }

    // Set up single progress bar for overall crawl progress (only if enabled)
    let progress_bar = if options.show_progress_bars {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .map_err(|e| format!("Invalid progress template: {}", e))?;
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(pb)
    } else {
        None
    };

    let processed_count = Arc::new(AtomicUsize::new(0));
    let crawler = Crawler::new(fetcher).with_scorer(build_scorer(&options.keywords));

    if let Some(ref callback) = progress_callback {
        callback(format!(
            "Crawling {} seed(s) with {} strategy",
            options.urls.len(),
            options.strategy
        ));
    }

    let runs = options.urls.iter().map(|seed| {
        let command = start_command(&options, seed);
        let (reporter, rx) = StatusReporter::channel();
        let listener = tokio::spawn(forward_events(
            seed.clone(),
            rx,
            progress_bar.clone(),
            processed_count.clone(),
            event_callback.clone(),
        ));
        let crawler = &crawler;
        let cancel = cancel.clone();

        async move {
            let outcome = crawler.crawl(&command, cancel, &reporter).await;
            // Closing the channel lets the listener drain and exit
            drop(reporter);
            if let Err(e) = listener.await {
                warn!("Event listener for {} failed: {}", command.seed, e);
            }
            (command.seed, outcome)
        }
    });

    let mut summaries = Vec::new();
    let mut failures = Vec::new();
    for (seed, outcome) in join_all(runs).await {
        match outcome {
            Ok(summary) => summaries.push(summary),
            Err(e) => {
                if let Some(ref callback) = progress_callback {
                    callback(format!("[!]  Failed to crawl {}: {}", seed, e));
                }
                failures.push(format!("{}: {}", seed, e));
            }
        }
    }

    if let Some(ref pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Crawl complete! {} pages visited", total));
    }

    if summaries.is_empty() {
        return Err(format!("Nothing was crawled: {}", failures.join("; ")));
    }

    Ok(summaries)
}

async fn forward_events(
    seed: String,
    mut rx: UnboundedReceiver<StatusEvent>,
    progress_bar: Option<ProgressBar>,
    processed_count: Arc<AtomicUsize>,
    event_callback: Option<CrawlEventCallback>,
) {
    while let Some(event) = rx.recv().await {
        if let StatusEvent::NodeVisited { url, .. } | StatusEvent::Error { url, .. } = &event {
            let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(ref pb) = progress_bar {
                pb.set_message(format!(
                    "Crawling... {} pages visited ({})",
                    count,
                    extract_url_path(url)
                ));
            }
        }

        if let Some(ref callback) = event_callback {
            callback(&seed, &event);
        }
    }
}
