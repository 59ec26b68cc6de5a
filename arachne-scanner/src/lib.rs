pub mod categorize;
pub mod crawler;
pub mod error;
pub mod event;
pub mod fetch;
pub mod frontier;
pub mod node;
pub mod result;
pub mod score;
pub mod state;
pub mod visited;

pub use categorize::{Categorizer, LinkCategory};
pub use crawler::Crawler;
pub use error::{CrawlError, FetchError};
pub use event::{StatusEvent, StatusReporter};
pub use fetch::{Fetcher, HttpFetcher};
pub use frontier::Strategy;
pub use result::{CrawlResult, CrawlSummary, FinishReason};
pub use score::Scorer;
pub use state::{CancelHandle, StartCommand};
