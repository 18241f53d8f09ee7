//! Error types for the extraction layer.
//!
//! The variant split mirrors how the strategy chain reacts: fetch failures
//! usually classify into a terminal page status and stop the chain, render
//! failures never do and let the chain move on to the next strategy.

use thiserror::Error;
use thirtyfour::error::WebDriverError;

use crate::crawl::PageStatus;
use crate::fetch::FetchError;

/// Errors surfaced by a single extraction strategy attempt.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The page text could not be fetched.
    #[error("fetch failed for {url}: {source}")]
    Fetch {
        /// The URL being extracted.
        url: String,
        /// The underlying fetch error.
        #[source]
        source: FetchError,
    },

    /// The headless browser failed to render the page.
    #[error("render failed for {url}: {source}")]
    Render {
        /// The URL being extracted.
        url: String,
        /// The underlying WebDriver error.
        #[source]
        source: WebDriverError,
    },
}

impl ExtractError {
    /// Creates a fetch error for the given URL.
    pub fn fetch(url: impl Into<String>, source: FetchError) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }

    /// Creates a render error for the given URL.
    pub fn render(url: impl Into<String>, source: WebDriverError) -> Self {
        Self::Render {
            url: url.into(),
            source,
        }
    }

    /// Maps a classifiable failure onto its terminal page status.
    ///
    /// Returns `None` for failures the chain should not treat as
    /// authoritative (render errors, unresolvable URLs); those are logged
    /// and the next strategy gets its turn.
    #[must_use]
    pub fn classify(&self) -> Option<PageStatus> {
        match self {
            Self::Fetch { source, .. } => classify_fetch(source),
            Self::Render { .. } => None,
        }
    }
}

fn classify_fetch(error: &FetchError) -> Option<PageStatus> {
    match error {
        FetchError::Timeout { .. } => Some(PageStatus::TimeoutError),
        FetchError::HttpStatus { status, .. } => Some(match *status {
            408 => PageStatus::TimeoutError,
            404 => PageStatus::NotFoundError,
            403 => PageStatus::Forbidden,
            500..=599 => PageStatus::ServerError,
            _ => PageStatus::HttpError,
        }),
        // request never made it to an HTTP response; still a fetch-level stop
        FetchError::Network { .. } | FetchError::Body { .. } => Some(PageStatus::HttpError),
        FetchError::InvalidUrl { .. } => None,
    }
}

// Note on From trait implementations:
// We intentionally do NOT implement `From<FetchError>` or
// `From<WebDriverError>` because both variants require the URL for context.
// The helper constructors are the conversion surface.
