//! Static-HTML extraction strategy.
//!
//! Fetches the page text over HTTP and scans the raw markup for anchors.
//! This covers the vast majority of pages; the scan also reports whether
//! `<script>` tags are present so the chain knows a JS-rendered page might
//! be hiding its links from the static pass.

use std::collections::HashSet;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::fetch::HttpClient;
use crate::parse::error::ExtractError;
use crate::parse::sanitizer::sanitize_url;
use crate::parse::service::{ExtractRequest, ExtractionStrategy, ParserResponse};

/// Links found in one pass over an HTML document.
pub(crate) struct LinkScan {
    /// Sanitized same-host links in document order, deduplicated.
    pub links: Vec<String>,
    /// Whether any `<script>` element is present.
    pub has_script_tags: bool,
}

/// Scans `html` for anchors, sanitizing each href against `page_url` and
/// keeping only links on `allowed_host`. Shared by the static and rendered
/// strategies; both parse their markup the same way.
///
/// # Panics
///
/// Never at runtime; the selector literals are constant and valid.
#[allow(clippy::expect_used)]
pub(crate) fn scan_links(html: &str, page_url: &str, allowed_host: &str) -> LinkScan {
    let anchors = Selector::parse("a[href]").expect("anchor selector is valid");
    let scripts = Selector::parse("script").expect("script selector is valid");

    let document = Html::parse_document(html);

    let mut links = Vec::new();
    let mut seen = HashSet::new();
    for element in document.select(&anchors) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(link) = sanitize_url(href, page_url) else {
            continue;
        };
        if !is_on_host(&link, allowed_host) {
            continue;
        }
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    let has_script_tags = document.select(&scripts).next().is_some();

    LinkScan {
        links,
        has_script_tags,
    }
}

fn is_on_host(link: &str, allowed_host: &str) -> bool {
    Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(|host| host == allowed_host))
        .unwrap_or(false)
}

/// Extraction strategy that works off the page text as served.
pub struct StaticHtmlParser {
    http: HttpClient,
}

impl StaticHtmlParser {
    /// Creates a static strategy over the given HTTP client.
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ExtractionStrategy for StaticHtmlParser {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn extract(&self, request: &ExtractRequest) -> Result<ParserResponse, ExtractError> {
        let html = self
            .http
            .get_text_with_retry(&request.url)
            .await
            .map_err(|source| ExtractError::fetch(request.url.clone(), source))?;

        let scan = scan_links(&html, &request.url, &request.allowed_host);
        debug!(
            url = %request.url,
            links = scan.links.len(),
            has_script_tags = scan.has_script_tags,
            "static scan complete"
        );

        Ok(ParserResponse::extracted(scan.links, scan.has_script_tags))
    }
}
