//! Rendered-DOM extraction strategy.
//!
//! For JS-heavy pages whose anchors only exist after client-side
//! rendering (typical for React or Angular sites that ship an empty
//! shell plus script). The page text is fetched over the normal HTTP
//! stack, injected into a headless browser document, given a bounded
//! window to settle, and then scanned exactly like the static strategy.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::fetch::HttpClient;
use crate::parse::browser::BrowserProvider;
use crate::parse::error::ExtractError;
use crate::parse::service::{ExtractRequest, ExtractionStrategy, ParserResponse};
use crate::parse::static_html::scan_links;

/// Extraction strategy backed by a headless browser.
pub struct RenderedHtmlParser {
    http: HttpClient,
    browser: Arc<BrowserProvider>,
}

impl RenderedHtmlParser {
    /// Creates a rendered strategy over the given HTTP client and browser.
    #[must_use]
    pub fn new(http: HttpClient, browser: Arc<BrowserProvider>) -> Self {
        Self { http, browser }
    }
}

#[async_trait]
impl ExtractionStrategy for RenderedHtmlParser {
    fn name(&self) -> &'static str {
        "rendered"
    }

    async fn extract(&self, request: &ExtractRequest) -> Result<ParserResponse, ExtractError> {
        info!(url = %request.url, "rendering page in headless browser");

        let html = self
            .http
            .get_text_with_retry(&request.url)
            .await
            .map_err(|source| ExtractError::fetch(request.url.clone(), source))?;

        let rendered = self
            .browser
            .render(&html)
            .await
            .map_err(|source| ExtractError::render(request.url.clone(), source))?;

        let scan = scan_links(&rendered, &request.url, &request.allowed_host);
        debug!(
            url = %request.url,
            links = scan.links.len(),
            has_script_tags = scan.has_script_tags,
            "rendered scan complete"
        );

        Ok(ParserResponse::extracted(scan.links, scan.has_script_tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::browser::DEFAULT_WEBDRIVER_URL;

    #[test]
    fn test_rendered_strategy_name() {
        let strategy = RenderedHtmlParser::new(
            HttpClient::new(),
            Arc::new(BrowserProvider::new(DEFAULT_WEBDRIVER_URL)),
        );
        assert_eq!(strategy.name(), "rendered");
    }
}
