use anyhow::{Context, Result, anyhow};
use arachne_core::crawl::{CrawlEventCallback, CrawlOptions, CrawlProgressCallback, execute_crawl};
use arachne_core::report::{ReportFormat, render_report, save_report};
use arachne_scanner::{CancelHandle, LinkCategory, StatusEvent, Strategy};
use chrono::{DateTime, Local};
use clap::ArgMatches;
use colored::Colorize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::Level;
use url::Url;

// Helper functions for crawl handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(
    url: Option<&Url>,
    hosts_file: Option<&PathBuf>,
) -> Result<Vec<String>, String> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        Err("Either --url or --hosts-file must be provided".to_string())
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read hosts file {}: {}", path.display(), e))?;

    let urls: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_url_line(line.trim()))
        .collect();

    if urls.is_empty() {
        return Err(format!("No valid URLs found in {}", path.display()));
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    eprintln!("{}  Skipping invalid URL '{}'", "⚠".yellow(), line);
    None
}

/// Parses `-d/--max-depth`: a number, or `unlimited` / `none` for no bound.
pub fn parse_max_depth(value: &str) -> Result<Option<usize>, String> {
    match value.trim().to_lowercase().as_str() {
        "unlimited" | "none" => Ok(None),
        other => other
            .parse::<usize>()
            .map(Some)
            .map_err(|_| format!("'{}' is not a depth; use a number or 'unlimited'", value)),
    }
}

/// Maps `-v` occurrences to a log level. Warnings are always shown.
pub fn level_for_verbosity(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    }
}

/// Installs the stderr log subscriber. Safe to call more than once.
pub fn init_tracing(verbosity: u8) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level_for_verbosity(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// One line of the error log.
pub fn format_error_line(timestamp: DateTime<Local>, seed: &str, url: &str, message: &str) -> String {
    format!(
        "[{}] seed={} url={} error={}",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        seed,
        url,
        message
    )
}

/// Opens `path` for appending, expanding a leading `~`.
pub fn open_error_log(path: &str) -> Result<File> {
    let expanded = shellexpand::tilde(path);
    let path = Path::new(expanded.as_ref());
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open error log {}", path.display()))
}

/// Event callback that appends every `Error` event to `file`.
pub fn error_log_callback(file: File) -> CrawlEventCallback {
    let file = Mutex::new(file);
    Arc::new(move |seed: &str, event: &StatusEvent| {
        if let StatusEvent::Error { url, message } = event
            && let Ok(mut file) = file.lock()
        {
            let line = format_error_line(Local::now(), seed, url, message);
            if let Err(e) = writeln!(file, "{}", line) {
                tracing::warn!("Could not write to error log: {}", e);
            }
        }
    })
}

/// Build crawl options from the `crawl` subcommand's arguments.
pub fn crawl_options_from_args(sub_matches: &ArgMatches, urls: Vec<String>) -> CrawlOptions {
    let categories: Option<Vec<LinkCategory>> = sub_matches
        .get_many::<LinkCategory>("category")
        .map(|values| values.copied().collect());
    let keywords: Vec<String> = sub_matches
        .get_many::<String>("keyword")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    CrawlOptions {
        urls,
        strategy: sub_matches
            .get_one::<Strategy>("strategy")
            .copied()
            .unwrap_or(Strategy::Bfs),
        max_nodes: sub_matches.get_one::<usize>("max-nodes").copied(),
        max_depth: sub_matches
            .get_one::<Option<usize>>("max-depth")
            .copied()
            .unwrap_or(CrawlOptions::default().max_depth),
        categories,
        keywords,
        timeout_secs: sub_matches.get_one::<u64>("timeout").copied().unwrap_or(10),
        show_progress_bars: false,
    }
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool, verbosity: u8) -> Result<()> {
    init_tracing(verbosity);

    let url = sub_matches.get_one::<Url>("url");
    let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");
    let urls = load_urls_from_source(url, hosts_file).map_err(|e| anyhow!(e))?;

    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|f| ReportFormat::from_str(f))
        .unwrap_or(ReportFormat::Text);
    let top = sub_matches.get_one::<usize>("top").copied().unwrap_or(0);
    let output = sub_matches.get_one::<PathBuf>("output");

    let mut options = crawl_options_from_args(sub_matches, urls);
    options.show_progress_bars = !quiet;

    if !quiet {
        eprintln!("\n{}  Crawling {} host(s)", "🕷".cyan(), options.urls.len());
        eprintln!("Strategy: {}", options.strategy);
        match options.max_depth {
            Some(depth) => eprintln!("Max depth: {}", depth),
            None => eprintln!("Max depth: unlimited"),
        }
        if let Some(max_nodes) = options.max_nodes {
            eprintln!("Max nodes: {}", max_nodes);
        }
        match &options.categories {
            Some(categories) => {
                let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
                eprintln!("Following: {}\n", names.join(", "));
            }
            None => eprintln!("Following: {}\n", LinkCategory::InternalPage),
        }
    }

    let event_callback = match sub_matches.get_one::<String>("error-log") {
        Some(path) => Some(error_log_callback(open_error_log(path)?)),
        None => None,
    };

    let progress_callback: Option<CrawlProgressCallback> = if quiet {
        None
    } else {
        Some(Arc::new(|msg: String| {
            eprintln!("{}", msg);
        }))
    };

    let cancel = CancelHandle::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{} Cancelling crawl...", "✗".red());
            signal_cancel.cancel();
        }
    });

    let summaries = execute_crawl(options, cancel, progress_callback, event_callback)
        .await
        .map_err(|e| anyhow!("Crawl failed: {}", e))?;

    if !quiet {
        eprintln!("\n{} Crawl complete!\n", "✓".green().bold());
    }

    let report = render_report(&summaries, format, top).context("Failed to render report")?;
    match output {
        Some(path) => {
            save_report(&report, path)
                .with_context(|| format!("Failed to save report to {}", path.display()))?;
            if !quiet {
                eprintln!("{} Report saved to {}", "✓".green(), path.display());
            }
        }
        None => print!("{}", report),
    }

    Ok(())
}
