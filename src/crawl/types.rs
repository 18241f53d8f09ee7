//! Core crawl types: frontier links, recorded pages, and run options.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::crawl::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_DEPTH, DEFAULT_MAX_RETRIES,
};

/// Outcome classification for one processed page.
///
/// Produced by the extraction chain (fetch/parse outcomes) or by the
/// orchestrator itself (`Disallowed` policy skips).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    /// Extraction succeeded and at least one link was found.
    Ok,
    /// Page fetched and parsed cleanly but contained no usable links.
    NoLinksFound,
    /// Upstream returned a 5xx after the fetch layer gave up retrying.
    ServerError,
    /// The HTTP client timed out talking to the host.
    TimeoutError,
    /// Upstream returned 404.
    NotFoundError,
    /// Upstream returned 403.
    Forbidden,
    /// Any other non-success HTTP status.
    HttpError,
    /// Every extraction strategy was exhausted without a conclusive result.
    ParserError,
    /// Skipped by robots.txt policy; never fetched.
    Disallowed,
    /// Unclassifiable failure.
    UnknownError,
}

impl PageStatus {
    /// Returns the database string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NoLinksFound => "no_links_found",
            Self::ServerError => "server_error",
            Self::TimeoutError => "timeout_error",
            Self::NotFoundError => "not_found_error",
            Self::Forbidden => "forbidden",
            Self::HttpError => "http_error",
            Self::ParserError => "parser_error",
            Self::Disallowed => "disallowed",
            Self::UnknownError => "unknown_error",
        }
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() keeps the status column alignment in console output
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for PageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(Self::Ok),
            "no_links_found" => Ok(Self::NoLinksFound),
            "server_error" => Ok(Self::ServerError),
            "timeout_error" => Ok(Self::TimeoutError),
            "not_found_error" => Ok(Self::NotFoundError),
            "forbidden" => Ok(Self::Forbidden),
            "http_error" => Ok(Self::HttpError),
            "parser_error" => Ok(Self::ParserError),
            "disallowed" => Ok(Self::Disallowed),
            "unknown_error" => Ok(Self::UnknownError),
            _ => Err(format!("invalid page status: {s}")),
        }
    }
}

/// One unit of frontier work: a URL accepted for crawling.
///
/// Immutable once enqueued; a timed-out link re-enters the queue as a *new*
/// `Link` with `retries` bumped, never by mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Absolute, sanitized URL.
    pub url: String,
    /// Host this link belongs to.
    pub domain: String,
    /// Distance from the seed (seed = 0).
    pub depth: u32,
    /// How many timed-out attempts this URL has already burned.
    pub retries: u32,
}

impl Link {
    /// Frontier entry for a freshly discovered URL.
    #[must_use]
    pub fn new(url: impl Into<String>, domain: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            domain: domain.into(),
            depth,
            retries: 0,
        }
    }

    /// Replacement entry for a timed-out attempt.
    #[must_use]
    pub fn retry(&self) -> Self {
        Self {
            url: self.url.clone(),
            domain: self.domain.clone(),
            depth: self.depth,
            retries: self.retries + 1,
        }
    }
}

/// One recorded crawl outcome: a page and its outbound links.
///
/// Append-only; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// The crawled URL.
    pub page_url: String,
    /// Host the page belongs to.
    pub domain: String,
    /// Distance from the seed.
    pub depth: u32,
    /// Sanitized same-host outbound links found on the page.
    pub links: Vec<String>,
    /// Outcome classification.
    pub status: PageStatus,
    /// When this record was produced (UTC).
    pub last_modified: DateTime<Utc>,
    /// Crawl job this page belongs to.
    pub job_id: Uuid,
}

impl Page {
    /// Creates a page record stamped with the current time.
    #[must_use]
    pub fn new(
        page_url: impl Into<String>,
        domain: impl Into<String>,
        depth: u32,
        links: Vec<String>,
        status: PageStatus,
        job_id: Uuid,
    ) -> Self {
        Self {
            page_url: page_url.into(),
            domain: domain.into(),
            depth,
            links,
            status,
            last_modified: Utc::now(),
            job_id,
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Page {{ url: {}, depth: {}, status: {}, links: {} }}",
            self.page_url,
            self.depth,
            self.status,
            self.links.len()
        )
    }
}

/// Tunables for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlOptions {
    /// Maximum link depth below the seed.
    pub max_depth: u32,
    /// Per-link retry bound for timed-out extraction attempts.
    pub max_retries: u32,
    /// Worker pool size.
    pub concurrency: usize,
    /// Wall-clock budget for one extraction attempt.
    pub fetch_timeout: Duration,
    /// Per-domain delay applied when robots.txt sets no crawl-delay
    /// (milliseconds; 0 disables).
    pub default_politeness_ms: u64,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_retries: DEFAULT_MAX_RETRIES,
            concurrency: DEFAULT_CONCURRENCY,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            default_politeness_ms: 0,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // ==================== PageStatus Tests ====================

    #[test]
    fn test_page_status_as_str() {
        assert_eq!(PageStatus::Ok.as_str(), "ok");
        assert_eq!(PageStatus::NoLinksFound.as_str(), "no_links_found");
        assert_eq!(PageStatus::ServerError.as_str(), "server_error");
        assert_eq!(PageStatus::TimeoutError.as_str(), "timeout_error");
        assert_eq!(PageStatus::NotFoundError.as_str(), "not_found_error");
        assert_eq!(PageStatus::Forbidden.as_str(), "forbidden");
        assert_eq!(PageStatus::HttpError.as_str(), "http_error");
        assert_eq!(PageStatus::ParserError.as_str(), "parser_error");
        assert_eq!(PageStatus::Disallowed.as_str(), "disallowed");
        assert_eq!(PageStatus::UnknownError.as_str(), "unknown_error");
    }

    #[test]
    fn test_page_status_from_str_roundtrip() {
        for status in [
            PageStatus::Ok,
            PageStatus::NoLinksFound,
            PageStatus::ServerError,
            PageStatus::TimeoutError,
            PageStatus::NotFoundError,
            PageStatus::Forbidden,
            PageStatus::HttpError,
            PageStatus::ParserError,
            PageStatus::Disallowed,
            PageStatus::UnknownError,
        ] {
            assert_eq!(status.as_str().parse::<PageStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_page_status_from_str_invalid() {
        let result = "teapot".parse::<PageStatus>();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("invalid page status"));
    }

    #[test]
    fn test_page_status_serde_roundtrip() {
        let json = serde_json::to_string(&PageStatus::NoLinksFound).unwrap();
        assert_eq!(json, "\"no_links_found\"");
        let parsed: PageStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, PageStatus::NoLinksFound);
    }

    // ==================== Link Tests ====================

    #[test]
    fn test_link_new_starts_with_zero_retries() {
        let link = Link::new("https://example.com/a", "example.com", 2);
        assert_eq!(link.retries, 0);
        assert_eq!(link.depth, 2);
    }

    #[test]
    fn test_link_retry_bumps_count_and_keeps_rest() {
        let link = Link::new("https://example.com/a", "example.com", 1);
        let retried = link.retry();
        assert_eq!(retried.retries, 1);
        assert_eq!(retried.retry().retries, 2);
        assert_eq!(retried.url, link.url);
        assert_eq!(retried.depth, link.depth);
    }

    // ==================== Page Tests ====================

    #[test]
    fn test_page_new_stamps_timestamp() {
        let before = Utc::now();
        let page = Page::new(
            "https://example.com/",
            "example.com",
            0,
            vec!["https://example.com/a".to_string()],
            PageStatus::Ok,
            Uuid::new_v4(),
        );
        assert!(page.last_modified >= before);
        assert!(page.last_modified <= Utc::now());
    }

    #[test]
    fn test_page_display_includes_status_and_count() {
        let page = Page::new(
            "https://example.com/",
            "example.com",
            0,
            vec![],
            PageStatus::NoLinksFound,
            Uuid::new_v4(),
        );
        let display = page.to_string();
        assert!(display.contains("no_links_found"));
        assert!(display.contains("links: 0"));
    }

    #[test]
    fn test_crawl_options_defaults() {
        let opts = CrawlOptions::default();
        assert_eq!(opts.max_depth, 1);
        assert_eq!(opts.max_retries, 2);
        assert_eq!(opts.concurrency, 4);
        assert_eq!(opts.fetch_timeout, Duration::from_secs(10));
        assert_eq!(opts.default_politeness_ms, 0);
    }
}
