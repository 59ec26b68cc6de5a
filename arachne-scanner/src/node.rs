use serde::{Deserialize, Serialize};
use url::Url;

/// A page waiting in (or popped from) a frontier.
///
/// Identity is the normalized URL string; two nodes with the same `url` are
/// the same page no matter how they were reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlNode {
    pub url: String,
    pub depth: usize,
    pub discovery_order: u64,
    pub parent: Option<String>,
    pub score: f64,
}

impl UrlNode {
    pub fn seed(url: String) -> Self {
        Self {
            url,
            depth: 0,
            discovery_order: 0,
            parent: None,
            score: 0.0,
        }
    }

    /// Builds a child one level below `self`.
    pub fn child(&self, url: String, discovery_order: u64, score: f64) -> Self {
        Self {
            url,
            depth: self.depth + 1,
            discovery_order,
            parent: Some(self.url.clone()),
            score,
        }
    }

    pub fn is_seed(&self) -> bool {
        self.parent.is_none()
    }
}

/// Canonical string form of a URL: no fragment, no trailing slash on a
/// non-root path.
pub fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    url.to_string()
}

/// Parses and normalizes, returning `None` for anything `Url` rejects.
pub fn normalize_str(raw: &str) -> Option<String> {
    Url::parse(raw.trim()).ok().map(|u| normalize_url(&u))
}
