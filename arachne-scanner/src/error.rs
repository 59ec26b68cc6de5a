use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a single page could not be fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchErrorKind {
    Network,
    Parse,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind:?} error: {message}")]
pub struct FetchError {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Network,
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Parse,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::network(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Category filter is empty, nothing would be crawled past the seed")]
    EmptyCategoryFilter,

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

impl CrawlError {
    /// Configuration errors are detected before any fetch and end the run as `Failed`.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, CrawlError::Fetch(_))
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
