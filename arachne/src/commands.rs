use crate::CLAP_STYLING;
use arachne::handlers::parse_max_depth;
use arachne_scanner::{LinkCategory, Strategy};
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("arachne")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("arachne")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .arg(
            arg!(-v --"verbose" "Log more; repeat for debug output")
                .required(false)
                .global(true)
                .action(clap::ArgAction::Count),
        )
        .subcommand_required(false)
        .subcommand(
            command!("crawl")
                .about(
                    "Crawl a host or collection of hosts, sorting every link found into \
                categories.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("The URL to crawl")
                        .value_parser(clap::value_parser!(Url))
                        .conflicts_with("hosts-file"),
                )
                .arg(
                    arg!(-H --"hosts-file" <PATH>)
                        .required(false)
                        .help("Path to a newline-delimited file of URLs to crawl")
                        .value_parser(clap::value_parser!(std::path::PathBuf))
                        .conflicts_with("url"),
                )
                .arg(
                    arg!(-s --"strategy" <STRATEGY>)
                        .required(false)
                        .help("Traversal order: bfs, dfs, best-first, iterative-deepening")
                        .value_parser(clap::value_parser!(Strategy))
                        .default_value("bfs"),
                )
                .arg(
                    arg!(-n --"max-nodes" <COUNT>)
                        .required(false)
                        .help("Stop after visiting this many pages (default: unlimited)")
                        .value_parser(clap::builder::RangedU64ValueParser::<usize>::new().range(1..)),
                )
                .arg(
                    arg!(-d --"max-depth" <DEPTH>)
                        .required(false)
                        .help("Do not follow links deeper than this; 'unlimited' for no bound")
                        .value_parser(parse_max_depth)
                        .default_value("3"),
                )
                .arg(
                    arg!(-c --"category" <CATEGORY>)
                        .required(false)
                        .help(
                            "Link category to follow; repeatable. One of internal-page, \
                        external-page, image, document, script-or-style, other \
                        (default: internal-page)",
                        )
                        .value_parser(clap::value_parser!(LinkCategory))
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(-k --"keyword" <WORD>)
                        .required(false)
                        .help("Rank best-first candidates by this keyword; repeatable")
                        .action(clap::ArgAction::Append),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save report to file (default: display to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    arg!(--"top" <N>)
                        .required(false)
                        .help("Include the N most referenced links in the report")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"error-log" <PATH>)
                        .required(false)
                        .help("Append fetch errors with timestamps to this file"),
                ),
        )
}
