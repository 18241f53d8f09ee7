//! HTTP client wrapper for fetching page text.
//!
//! This module provides the `HttpClient` struct which fetches page bodies as
//! text with proper timeout configuration, error classification, and a
//! transport-level retry loop. Every crawl request (pages and robots.txt)
//! goes through here.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use tracing::{debug, instrument, warn};

use super::error::FetchError;
use super::retry::{FailureType, RetryDecision, RetryPolicy, parse_retry_after};
use crate::user_agent;

/// Default HTTP connect timeout (seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default HTTP read timeout (seconds). Pages are text, not large files.
pub const READ_TIMEOUT_SECS: u64 = 30;

/// HTTP client for fetching page text.
///
/// Designed to be created once and reused across every worker, taking
/// advantage of connection pooling. Cloning is cheap (the inner reqwest
/// client is an `Arc`).
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retry_policy: RetryPolicy,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 10 seconds
    /// - Read timeout: 30 seconds
    /// - Gzip decompression and a cookie store: enabled
    /// - User-Agent: the crawler identity header
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self {
            client,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Replaces the transport retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Fetches the body at `url` as text. Single attempt, no retry.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Timeout`] when the client times out,
    /// [`FetchError::Network`] for transport failures,
    /// [`FetchError::HttpStatus`] for non-2xx responses (with any
    /// Retry-After header attached), and [`FetchError::Body`] when the body
    /// cannot be decoded as text.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send_request(url).await?;
        response.text().await.map_err(|e| FetchError::body(url, e))
    }

    /// Fetches the body at `url` as text, retrying transient failures.
    ///
    /// Timeouts, 5xx, and 429 responses are retried with exponential backoff
    /// per the configured [`RetryPolicy`]; a parseable Retry-After header on
    /// 429/503 overrides the computed backoff. Permanent failures (404, 403,
    /// malformed URL) return immediately.
    ///
    /// # Errors
    ///
    /// Returns the final [`FetchError`] once the policy stops retrying.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_text_with_retry(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 1u32;
        loop {
            let error = match self.get_text(url).await {
                Ok(text) => return Ok(text),
                Err(error) => error,
            };

            match self.retry_policy.should_retry(FailureType::of(&error), attempt) {
                RetryDecision::DoNotRetry { reason } => {
                    debug!(%error, reason, "giving up on fetch");
                    return Err(error);
                }
                RetryDecision::Retry {
                    delay,
                    attempt: next_attempt,
                } => {
                    // A server-mandated Retry-After wins over computed backoff
                    let wait = retry_after_hint(&error).unwrap_or(delay);
                    warn!(
                        attempt,
                        next_attempt,
                        wait_ms = wait.as_millis() as u64,
                        %error,
                        "transient fetch failure, backing off"
                    );
                    tokio::time::sleep(wait).await;
                    attempt = next_attempt;
                }
            }
        }
    }

    async fn send_request(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let parsed = url::Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(url)
            } else {
                FetchError::network(url, e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(std::string::ToString::to_string);
            return Err(FetchError::http_status_with_retry_after(
                url, status, retry_after,
            ));
        }

        Ok(response)
    }
}

/// Extracts a server-mandated wait from a fetch error, if one was attached.
fn retry_after_hint(error: &FetchError) -> Option<Duration> {
    match error {
        FetchError::HttpStatus {
            retry_after: Some(value),
            ..
        } => parse_retry_after(value),
        _ => None,
    }
}
