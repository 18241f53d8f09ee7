//! Fetch failure classification.
//!
//! The variant split is load-bearing: the extraction chain turns a
//! [`FetchError`] into a terminal page status (`Timeout` becomes
//! `timeout_error`, a 4xx/5xx becomes `client_error`/`server_error`),
//! and the retry layer decides from the same variants whether another
//! attempt is worth making. Collapsing these into a single opaque error
//! would lose both call sites.

use thiserror::Error;

/// A failed attempt to fetch a URL's body as text.
///
/// Every variant carries the URL it happened on; reqwest errors do not
/// reliably retain it, and log lines without it are useless mid-crawl.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport failure below HTTP: DNS, refused connection, TLS.
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The client gave up waiting (connect or read timeout).
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        url: String,
        status: u16,
        /// Raw Retry-After header, kept verbatim so the retry layer can
        /// parse it (429 and 503 responses).
        retry_after: Option<String>,
    },

    /// The URL did not parse, so no request was ever sent.
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Got a 2xx but the body would not decode as text.
    #[error("unreadable body fetching {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

// No `From<reqwest::Error>`: the conversion needs the URL, which the
// source error does not carry. Constructors below are the only way in.
impl FetchError {
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::http_status_with_retry_after(url, status, None)
    }

    pub fn http_status_with_retry_after(
        url: impl Into<String>,
        status: u16,
        retry_after: Option<String>,
    ) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            retry_after,
        }
    }

    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    pub fn body(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Body {
            url: url.into(),
            source,
        }
    }

    /// The HTTP status code, when the failure was a status response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        if let Self::HttpStatus { status, .. } = self {
            Some(*status)
        } else {
            None
        }
    }
}
