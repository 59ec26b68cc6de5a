use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use url::Url;

const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "bmp", "ico", "tif", "tiff", "avif",
];

const DEFAULT_DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "csv", "txt", "rtf", "odt", "ods", "odp",
    "epub", "zip",
];

/// The fixed set of buckets every discovered link lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkCategory {
    InternalPage,
    ExternalPage,
    Image,
    Document,
    ScriptOrStyle,
    Other,
}

impl LinkCategory {
    pub const ALL: [LinkCategory; 6] = [
        LinkCategory::InternalPage,
        LinkCategory::ExternalPage,
        LinkCategory::Image,
        LinkCategory::Document,
        LinkCategory::ScriptOrStyle,
        LinkCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkCategory::InternalPage => "internal-page",
            LinkCategory::ExternalPage => "external-page",
            LinkCategory::Image => "image",
            LinkCategory::Document => "document",
            LinkCategory::ScriptOrStyle => "script-or-style",
            LinkCategory::Other => "other",
        }
    }
}

impl fmt::Display for LinkCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "internal-page" | "internal" => Ok(LinkCategory::InternalPage),
            "external-page" | "external" => Ok(LinkCategory::ExternalPage),
            "image" | "images" => Ok(LinkCategory::Image),
            "document" | "documents" => Ok(LinkCategory::Document),
            "script-or-style" | "script" | "style" => Ok(LinkCategory::ScriptOrStyle),
            "other" => Ok(LinkCategory::Other),
            other => Err(format!("Unknown link category '{}'", other)),
        }
    }
}

/// The element an href was found on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkTag {
    Anchor,
    Image,
    Script,
    Stylesheet,
    Other(String),
}

impl LinkTag {
    fn is_script_or_style(&self) -> bool {
        matches!(self, LinkTag::Script | LinkTag::Stylesheet)
    }
}

/// What the fetcher saw around an href.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkContext {
    pub tag: LinkTag,
    pub anchor_text: Option<String>,
}

impl LinkContext {
    pub fn anchor(text: impl Into<String>) -> Self {
        Self {
            tag: LinkTag::Anchor,
            anchor_text: Some(text.into()),
        }
    }

    pub fn tag(tag: LinkTag) -> Self {
        Self {
            tag,
            anchor_text: None,
        }
    }
}

/// Everything outside the href itself that classification depends on.
#[derive(Debug, Clone)]
pub struct CategoryContext<'a> {
    pub base: &'a Url,
    pub seed_domain: &'a str,
    pub link: &'a LinkContext,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedLink {
    pub category: LinkCategory,
    pub resolved: Option<Url>,
}

/// Rule-based link classifier. First matching rule wins.
#[derive(Debug, Clone)]
pub struct Categorizer {
    image_extensions: HashSet<String>,
    document_extensions: HashSet<String>,
}

impl Categorizer {
    pub fn new() -> Self {
        Self {
            image_extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            document_extensions: DEFAULT_DOCUMENT_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn with_image_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.image_extensions = normalize_extensions(extensions);
        self
    }

    pub fn with_document_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.document_extensions = normalize_extensions(extensions);
        self
    }

    pub fn categorize(&self, href: &str, ctx: &CategoryContext<'_>) -> LinkCategory {
        self.classify(href, ctx).category
    }

    pub fn classify(&self, href: &str, ctx: &CategoryContext<'_>) -> ClassifiedLink {
        let href = href.trim();
        if href.is_empty() {
            return ClassifiedLink {
                category: LinkCategory::Other,
                resolved: None,
            };
        }

        let Ok(resolved) = ctx.base.join(href) else {
            return ClassifiedLink {
                category: LinkCategory::Other,
                resolved: None,
            };
        };

        let category = self.category_for(&resolved, ctx);
        ClassifiedLink {
            category,
            resolved: Some(resolved),
        }
    }

    fn category_for(&self, resolved: &Url, ctx: &CategoryContext<'_>) -> LinkCategory {
        let is_web = matches!(resolved.scheme(), "http" | "https");
        let host = resolved.host_str().filter(|_| is_web);

        if let Some(ext) = path_extension(resolved) {
            if self.image_extensions.contains(&ext) {
                return LinkCategory::Image;
            }
            if self.document_extensions.contains(&ext) {
                return LinkCategory::Document;
            }
        }

        if let Some(host) = host
            && is_same_registered_domain(host, ctx.seed_domain)
        {
            return LinkCategory::InternalPage;
        }

        if ctx.link.tag.is_script_or_style() {
            return LinkCategory::ScriptOrStyle;
        }

        if host.is_some() {
            return LinkCategory::ExternalPage;
        }

        LinkCategory::Other
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_extensions<I, S>(extensions: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Lowercased extension of the last path segment, if it has one.
fn path_extension(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Registrable domain (eTLD+1) of `host` per the public suffix list, so
/// `docs.example.com` and `www.example.co.uk` reduce to `example.com` and
/// `example.co.uk`. IP addresses and bare suffixes are returned unchanged.
pub fn registered_domain(host: &str) -> &str {
    let host = host.trim_end_matches('.');
    if host.starts_with('[') || host.parse::<IpAddr>().is_ok() {
        return host;
    }
    psl::domain_str(host).unwrap_or(host)
}

pub fn is_same_registered_domain(host: &str, seed_domain: &str) -> bool {
    let host = host.to_lowercase();
    let seed = seed_domain.to_lowercase();
    registered_domain(&host) == registered_domain(&seed)
}
