//! Link extraction strategy chain.
//!
//! Pages split into two classes: those whose anchors sit in the static
//! HTML, and those that only materialize links once client-side script has
//! run. The chain tries the cheap static strategy first and escalates to
//! the rendered strategy only when a pass comes back empty-handed with
//! script tags present. Fetch failures are authoritative wherever they
//! happen; a heavier strategy is never used to mask one.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::crawl::PageStatus;
use crate::parse::error::ExtractError;

/// One page to extract links from.
#[derive(Debug, Clone)]
pub struct ExtractRequest {
    /// Absolute URL of the page.
    pub url: String,
    /// Host a discovered link must belong to in order to survive filtering.
    pub allowed_host: String,
}

impl ExtractRequest {
    /// Creates a request for the given page URL and host filter.
    pub fn new(url: impl Into<String>, allowed_host: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            allowed_host: allowed_host.into(),
        }
    }
}

/// Outcome of extracting links from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserResponse {
    /// Same-host, sanitized, deduplicated links found on the page.
    pub links: Vec<String>,
    /// Classification of the extraction outcome.
    pub status: PageStatus,
    /// Whether the page carried `<script>` tags. Drives the rendered
    /// fallback; always `false` on a `NoLinksFound` response.
    pub has_script_tags: bool,
}

impl ParserResponse {
    /// Response for a strategy pass that completed without error. The
    /// chain decides the final status from the link count.
    #[must_use]
    pub fn extracted(links: Vec<String>, has_script_tags: bool) -> Self {
        Self {
            links,
            status: PageStatus::UnknownError,
            has_script_tags,
        }
    }

    /// Terminal response carrying no links.
    #[must_use]
    pub fn terminal(status: PageStatus) -> Self {
        Self {
            links: Vec::new(),
            status,
            has_script_tags: false,
        }
    }
}

/// One way of getting links out of a page.
#[async_trait]
pub trait ExtractionStrategy: Send + Sync {
    /// Short strategy name for logging.
    fn name(&self) -> &'static str;

    /// Attempts to extract links from the requested page.
    async fn extract(&self, request: &ExtractRequest) -> Result<ParserResponse, ExtractError>;
}

/// Ordered extraction strategy chain.
///
/// Strategies are tried in the order given to [`ParserService::new`];
/// the expected wiring is static first, rendered second.
pub struct ParserService {
    strategies: Vec<Arc<dyn ExtractionStrategy>>,
}

impl ParserService {
    /// Creates a chain over the given strategies.
    #[must_use]
    pub fn new(strategies: Vec<Arc<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    /// Runs the chain for one page and classifies the outcome.
    ///
    /// Chain rules, applied per strategy in order:
    /// - links found: `Ok`, chain stops
    /// - no links but script tags present: next strategy
    /// - no links, no script tags: `NoLinksFound`, chain stops
    /// - classifiable fetch failure: mapped status, chain stops
    /// - any other failure: logged, next strategy
    /// - chain exhausted: `ParserError`
    #[instrument(skip(self, request), fields(url = %request.url))]
    pub async fn parse_links(&self, request: &ExtractRequest) -> ParserResponse {
        for strategy in &self.strategies {
            match strategy.extract(request).await {
                Ok(mut response) if !response.links.is_empty() => {
                    debug!(
                        strategy = strategy.name(),
                        links = response.links.len(),
                        "extraction succeeded"
                    );
                    response.status = PageStatus::Ok;
                    return response;
                }
                Ok(response) if response.has_script_tags => {
                    debug!(
                        strategy = strategy.name(),
                        "no links but script tags present, falling back"
                    );
                }
                Ok(_) => {
                    debug!(strategy = strategy.name(), "no links and no script tags");
                    return ParserResponse::terminal(PageStatus::NoLinksFound);
                }
                Err(error) => {
                    if let Some(status) = error.classify() {
                        warn!(
                            strategy = strategy.name(),
                            status = status.as_str(),
                            %error,
                            "fetch failed during extraction"
                        );
                        return ParserResponse::terminal(status);
                    }
                    warn!(
                        strategy = strategy.name(),
                        %error,
                        "extraction strategy failed, trying next"
                    );
                }
            }
        }

        warn!("all extraction strategies failed");
        ParserResponse::terminal(PageStatus::ParserError)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::fetch::FetchError;

    /// Strategy with a scripted outcome, counting how often it runs.
    struct ScriptedStrategy {
        name: &'static str,
        script: Script,
        calls: AtomicUsize,
    }

    enum Script {
        Links(Vec<&'static str>),
        Empty { script_tags: bool },
        FetchStatus(u16),
        FetchTimeout,
        RenderFailure,
    }

    impl ScriptedStrategy {
        fn new(name: &'static str, script: Script) -> Arc<Self> {
            Arc::new(Self {
                name,
                script,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExtractionStrategy for ScriptedStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn extract(
            &self,
            request: &ExtractRequest,
        ) -> Result<ParserResponse, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                Script::Links(links) => Ok(ParserResponse::extracted(
                    links.iter().map(|link| (*link).to_string()).collect(),
                    false,
                )),
                Script::Empty { script_tags } => {
                    Ok(ParserResponse::extracted(Vec::new(), *script_tags))
                }
                Script::FetchStatus(status) => Err(ExtractError::fetch(
                    request.url.clone(),
                    FetchError::http_status(request.url.clone(), *status),
                )),
                Script::FetchTimeout => Err(ExtractError::fetch(
                    request.url.clone(),
                    FetchError::timeout(request.url.clone()),
                )),
                Script::RenderFailure => Err(ExtractError::render(
                    request.url.clone(),
                    thirtyfour::error::WebDriverError::CustomError("no session".to_string()),
                )),
            }
        }
    }

    fn request() -> ExtractRequest {
        ExtractRequest::new("https://example.com", "example.com")
    }

    // ==================== Chain Order Tests ====================

    #[tokio::test]
    async fn test_chain_returns_links_when_first_strategy_succeeds() {
        let first = ScriptedStrategy::new("static", Script::Links(vec!["https://example.com/p1"]));
        let second = ScriptedStrategy::new("rendered", Script::Links(vec![]));
        let service = ParserService::new(vec![first.clone(), second.clone()]);

        let result = service.parse_links(&request()).await;

        assert_eq!(result.status, PageStatus::Ok);
        assert_eq!(result.links, vec!["https://example.com/p1"]);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_chain_falls_back_when_no_links_but_script_tags() {
        let first = ScriptedStrategy::new("static", Script::Empty { script_tags: true });
        let second =
            ScriptedStrategy::new("rendered", Script::Links(vec!["https://example.com/p1"]));
        let service = ParserService::new(vec![first.clone(), second.clone()]);

        let result = service.parse_links(&request()).await;

        assert_eq!(result.status, PageStatus::Ok);
        assert_eq!(result.links.len(), 1);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_chain_stops_on_no_links_without_script_tags() {
        let first = ScriptedStrategy::new("static", Script::Empty { script_tags: false });
        let second =
            ScriptedStrategy::new("rendered", Script::Links(vec!["https://example.com/p1"]));
        let service = ParserService::new(vec![first.clone(), second.clone()]);

        let result = service.parse_links(&request()).await;

        assert_eq!(result.status, PageStatus::NoLinksFound);
        assert!(result.links.is_empty());
        assert!(!result.has_script_tags);
        assert_eq!(second.calls(), 0, "rendered strategy must not run");
    }

    // ==================== Fetch Classification Tests ====================

    #[tokio::test]
    async fn test_chain_maps_fetch_statuses_to_terminal_pages() {
        let cases = [
            (Script::FetchTimeout, PageStatus::TimeoutError),
            (Script::FetchStatus(408), PageStatus::TimeoutError),
            (Script::FetchStatus(404), PageStatus::NotFoundError),
            (Script::FetchStatus(403), PageStatus::Forbidden),
            (Script::FetchStatus(500), PageStatus::ServerError),
            (Script::FetchStatus(418), PageStatus::HttpError),
        ];

        for (script, expected) in cases {
            let first = ScriptedStrategy::new("static", script);
            let second =
                ScriptedStrategy::new("rendered", Script::Links(vec!["https://example.com/p1"]));
            let service = ParserService::new(vec![first, second.clone()]);

            let result = service.parse_links(&request()).await;

            assert_eq!(result.status, expected);
            assert!(result.links.is_empty());
            assert_eq!(
                second.calls(),
                0,
                "fetch errors must not be masked by a heavier strategy"
            );
        }
    }

    // ==================== Non-Classifiable Failure Tests ====================

    #[tokio::test]
    async fn test_chain_tries_next_strategy_on_render_failure() {
        let first = ScriptedStrategy::new("static", Script::RenderFailure);
        let second =
            ScriptedStrategy::new("rendered", Script::Links(vec!["https://example.com/p1"]));
        let service = ParserService::new(vec![first.clone(), second.clone()]);

        let result = service.parse_links(&request()).await;

        assert_eq!(result.status, PageStatus::Ok);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_chain_returns_parser_error_when_all_strategies_fail() {
        let first = ScriptedStrategy::new("static", Script::RenderFailure);
        let second = ScriptedStrategy::new("rendered", Script::RenderFailure);
        let service = ParserService::new(vec![first, second]);

        let result = service.parse_links(&request()).await;

        assert_eq!(result.status, PageStatus::ParserError);
        assert!(result.links.is_empty());
    }

    #[tokio::test]
    async fn test_chain_exhausted_with_script_tags_is_parser_error() {
        // the last strategy still seeing script tags has nowhere to fall to
        let only = ScriptedStrategy::new("static", Script::Empty { script_tags: true });
        let service = ParserService::new(vec![only.clone()]);

        let result = service.parse_links(&request()).await;

        assert_eq!(result.status, PageStatus::ParserError);
    }
}
