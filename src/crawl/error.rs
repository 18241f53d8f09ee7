//! Error types for crawl orchestration.

use thiserror::Error;

/// Errors that can end a crawl before or while the worker pool runs.
///
/// Per-link failures never surface here; they become terminal page
/// statuses or silent drops inside the worker loop. This type covers
/// failures of the run itself.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed URL could not be parsed or has no host.
    #[error("invalid seed URL {url}: {reason}")]
    InvalidSeed {
        /// The rejected seed.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A worker task panicked or was cancelled out from under the pool.
    #[error("crawl worker failed: {source}")]
    Worker {
        /// The underlying join error.
        #[source]
        source: tokio::task::JoinError,
    },
}

impl CrawlError {
    /// Creates an invalid-seed error.
    pub fn invalid_seed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSeed {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crawl_error_invalid_seed_display() {
        let error = CrawlError::invalid_seed("not a url", "relative URL without a base");
        let msg = error.to_string();
        assert!(msg.contains("invalid seed"), "Expected prefix in: {msg}");
        assert!(msg.contains("not a url"), "Expected URL in: {msg}");
    }
}
