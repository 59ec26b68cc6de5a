use crate::categorize::{LinkContext, LinkTag};
use crate::error::FetchError;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::future::Future;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

/// A raw link as it appeared on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundLink {
    pub href: String,
    pub context: LinkContext,
}

impl OutboundLink {
    pub fn new(href: impl Into<String>, context: LinkContext) -> Self {
        Self {
            href: href.into(),
            context,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Final URL after redirects; relative links resolve against it.
    pub url: String,
    /// Visible text, used by content-based scorers.
    pub content: String,
    pub links: Vec<OutboundLink>,
}

/// The one capability the engine needs from the outside world.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Page, FetchError>> + Send;
}

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href], img[src], script[src], link[href]").unwrap());

/// Fetches pages over HTTP and pulls links out of the HTML.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!(
                "Arachne/",
                env!("CARGO_PKG_VERSION"),
                " (https://github.com/trapdoorsec/arachne)"
            ))
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        debug!("Fetching {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::network(format!("HTTP {}", status.as_u16())));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let is_html = content_type
            .as_deref()
            .map(|ct| ct.contains("text/html") || ct.contains("application/xhtml"))
            .unwrap_or(false);
        if !is_html {
            return Err(FetchError::parse(format!(
                "Non-HTML content ({})",
                content_type.as_deref().unwrap_or("no content-type")
            )));
        }

        let body = response.text().await?;
        Ok(parse_page(final_url, &body))
    }
}

/// Parses an HTML document into text content and outbound links.
pub fn parse_page(url: String, html: &str) -> Page {
    let document = Html::parse_document(html);

    let links = document
        .select(&LINK_SELECTOR)
        .filter_map(outbound_link)
        .collect();

    let content = document
        .root_element()
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Page {
        url,
        content,
        links,
    }
}

fn outbound_link(element: ElementRef<'_>) -> Option<OutboundLink> {
    let el = element.value();
    let (href, tag) = match el.name() {
        "a" => (el.attr("href")?, LinkTag::Anchor),
        "img" => (el.attr("src")?, LinkTag::Image),
        "script" => (el.attr("src")?, LinkTag::Script),
        "link" => {
            let is_stylesheet = el
                .attr("rel")
                .map(|rel| rel.split_whitespace().any(|r| r.eq_ignore_ascii_case("stylesheet")))
                .unwrap_or(false);
            let tag = if is_stylesheet {
                LinkTag::Stylesheet
            } else {
                LinkTag::Other("link".to_string())
            };
            (el.attr("href")?, tag)
        }
        other => (el.attr("href")?, LinkTag::Other(other.to_string())),
    };

    let anchor_text = match tag {
        LinkTag::Anchor => {
            let text = element.text().collect::<Vec<_>>().join(" ");
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            (!text.is_empty()).then_some(text)
        }
        LinkTag::Image => el.attr("alt").map(|s| s.to_string()),
        _ => None,
    };

    Some(OutboundLink::new(href, LinkContext { tag, anchor_text }))
}
