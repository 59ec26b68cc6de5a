pub mod crawl;
pub mod report;

use colored::Colorize;

pub use crawl::{
    CrawlEventCallback, CrawlOptions, CrawlProgressCallback, execute_crawl, execute_crawl_with,
    extract_url_path,
};
pub use report::{ReportFormat, generate_crawl_report, generate_json_report, rank_links};

pub fn banner() -> String {
    format!(
        r#"
     _                   _
    / \   _ __ __ _  ___| |__  _ __   ___
   / _ \ | '__/ _` |/ __| '_ \| '_ \ / _ \
  / ___ \| | | (_| | (__| | | | | | |  __/
 /_/   \_\_|  \__,_|\___|_| |_|_| |_|\___|  v{}
"#,
        env!("CARGO_PKG_VERSION")
    )
}

pub fn print_banner() {
    eprintln!("{}", banner().cyan());
    eprintln!("{}\n", "  follows links, sorts what it finds".bright_black());
}
