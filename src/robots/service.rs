//! robots.txt retrieval with fail-soft semantics.

use tracing::{debug, instrument, warn};
use url::Url;

use super::rules::{RobotsRules, resolve_rules};
use crate::fetch::HttpClient;

/// Fetches and resolves robots.txt rules for a crawl run.
///
/// Resolution fails soft: any fetch or parse problem yields empty rules and
/// the crawl proceeds unrestricted. A site must publish a *valid* robots.txt
/// to restrict this crawler, never merely a broken one.
#[derive(Debug, Clone)]
pub struct RobotsService {
    client: HttpClient,
}

impl RobotsService {
    /// Creates a robots service over the shared HTTP client.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Fetches `{root}/robots.txt` and resolves the rule set for `agent`.
    #[instrument(skip(self), fields(root_url = %root_url, agent = %agent))]
    pub async fn get_rules(&self, root_url: &str, agent: &str) -> RobotsRules {
        let Some(robots_url) = robots_url(root_url) else {
            warn!("unparseable root URL, crawling unrestricted");
            return RobotsRules::default();
        };

        match self.client.get_text_with_retry(&robots_url).await {
            Ok(content) => {
                let rules = resolve_rules(&content, agent);
                debug!(
                    disallows = rules.disallows.len(),
                    allows = rules.allows.len(),
                    delay_ms = rules.delay_ms,
                    "robots rules resolved"
                );
                rules
            }
            Err(error) => {
                warn!(%error, "robots.txt unavailable, crawling unrestricted");
                RobotsRules::default()
            }
        }
    }
}

/// Builds the robots.txt URL for the root URL's origin.
fn robots_url(root_url: &str) -> Option<String> {
    let base = Url::parse(root_url).ok()?;
    base.join("/robots.txt").ok().map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_robots_url_from_root() {
        assert_eq!(
            robots_url("https://example.com").as_deref(),
            Some("https://example.com/robots.txt")
        );
    }

    #[test]
    fn test_robots_url_replaces_deep_path() {
        assert_eq!(
            robots_url("https://example.com/a/b/c?q=1").as_deref(),
            Some("https://example.com/robots.txt")
        );
    }

    #[test]
    fn test_robots_url_keeps_port() {
        assert_eq!(
            robots_url("http://localhost:8080/start").as_deref(),
            Some("http://localhost:8080/robots.txt")
        );
    }

    #[test]
    fn test_robots_url_invalid_input() {
        assert!(robots_url("not a url").is_none());
    }
}
