//! Transport-level retry for transient fetch failures.
//!
//! A single HTTP GET is rerun when its failure looks temporary: timeouts,
//! 5xx responses, and 429 rate limiting. Backoff doubles per attempt from a
//! small base, capped, with jitter so a pool of workers hitting the same
//! flaky host does not retry in lockstep. The orchestrator's link-level
//! retry sits above this layer and reacts only to whole-attempt timeouts;
//! the two never overlap.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, instrument, warn};

use super::FetchError;

/// Fetch attempts per GET, the initial attempt included.
pub const DEFAULT_FETCH_ATTEMPTS: u32 = 3;

/// First-retry backoff. Pages are cheap, so this starts low.
const BASE_BACKOFF: Duration = Duration::from_millis(500);

/// Ceiling on a single backoff wait.
const BACKOFF_CAP: Duration = Duration::from_secs(8);

/// Upper bound on the random jitter added to every backoff wait.
const JITTER_CEILING_MS: u64 = 250;

/// Longest server-mandated Retry-After this layer will honor.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

/// How a failed fetch relates to a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// May clear up on its own: timeouts, 5xx, most network errors.
    Transient,

    /// Retrying cannot help: 404, 403, TLS failures, malformed URLs.
    /// These surface as terminal page statuses instead.
    Permanent,

    /// HTTP 429. Retried like a transient failure, but a Retry-After
    /// header on the response overrides the computed backoff.
    RateLimited,
}

impl FailureType {
    /// Classifies a fetch error.
    ///
    /// Status codes: 408 and 5xx are transient, 429 is rate-limited, the
    /// rest of 4xx is permanent (404/403 become terminal page statuses,
    /// not retries). Client timeouts are transient. Network errors are
    /// transient unless they smell like TLS, which no retry will fix.
    /// Unparseable URLs and undecodable bodies are permanent.
    #[must_use]
    pub fn of(error: &FetchError) -> Self {
        match error {
            FetchError::HttpStatus { status, .. } => Self::from_status(*status),
            FetchError::Timeout { .. } => Self::Transient,
            FetchError::Network { source, .. } if is_tls_error(source) => Self::Permanent,
            FetchError::Network { .. } => Self::Transient,
            FetchError::InvalidUrl { .. } | FetchError::Body { .. } => Self::Permanent,
        }
    }

    fn from_status(status: u16) -> Self {
        match status {
            408 => Self::Transient,
            429 => Self::RateLimited,
            400..=499 => Self::Permanent,
            500..=599 => Self::Transient,
            // anything outside the error ranges is unexpected; do not retry
            _ => Self::Permanent,
        }
    }

    fn is_retryable(self) -> bool {
        !matches!(self, Self::Permanent)
    }
}

/// Whether (and when) to rerun a failed fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait out `delay`, then run attempt number `attempt`.
    Retry {
        /// Backoff to apply before the next attempt.
        delay: Duration,
        /// The upcoming attempt number (1-indexed; the first retry is 2).
        attempt: u32,
    },

    /// Stop here and surface the error.
    DoNotRetry {
        /// Why no further attempt is made.
        reason: String,
    },
}

/// Doubling-backoff retry budget for the fetch layer.
///
/// Attempt `n` waits `min(base << (n-1), cap)` plus jitter. With the
/// defaults that is roughly 500ms then 1s before the budget runs out.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_backoff: Duration,
    backoff_cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_FETCH_ATTEMPTS,
            base_backoff: BASE_BACKOFF,
            backoff_cap: BACKOFF_CAP,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with an explicit budget and backoff window.
    /// `max_attempts` counts the initial attempt and is clamped to >= 1.
    #[must_use]
    pub fn new(max_attempts: u32, base_backoff: Duration, backoff_cap: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_backoff,
            backoff_cap,
        }
    }

    /// Default backoff window with a custom attempt budget.
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// The configured attempt budget.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Decides whether the fetch that just failed as `failure` on attempt
    /// number `attempt` (1-indexed) gets another try.
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, failure: FailureType, attempt: u32) -> RetryDecision {
        if !failure.is_retryable() {
            return RetryDecision::DoNotRetry {
                reason: "permanent failure - retry would not help".to_string(),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "attempt budget spent");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let delay = self.backoff(attempt) + jitter();
        debug!(
            attempt,
            next_attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            "will retry"
        );

        RetryDecision::Retry {
            delay,
            attempt: attempt + 1,
        }
    }

    /// Backoff for the retry following attempt `attempt`, jitter excluded.
    fn backoff(&self, attempt: u32) -> Duration {
        // cap the shift so the multiplication cannot overflow
        let doublings = (attempt - 1).min(16);
        self.base_backoff
            .saturating_mul(1 << doublings)
            .min(self.backoff_cap)
    }
}

/// Random jitter in `0..=JITTER_CEILING_MS` milliseconds.
fn jitter() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(0..=JITTER_CEILING_MS))
}

/// Whether a reqwest error looks like a TLS or certificate failure.
fn is_tls_error(error: &reqwest::Error) -> bool {
    let text = error.to_string().to_lowercase();
    ["certificate", "tls", "ssl", "handshake"]
        .iter()
        .any(|needle| text.contains(needle))
}

/// Parses a Retry-After header value into a wait.
///
/// Accepts both RFC 7231 forms, delta-seconds (`120`) and an HTTP-date.
/// A date in the past yields zero; anything unparseable or negative is
/// `None`; values past one hour are capped.
#[must_use]
#[instrument]
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    let value = header_value.trim();

    if let Ok(seconds) = value.parse::<i64>() {
        let seconds = u64::try_from(seconds).ok()?;
        return Some(cap_retry_after(Duration::from_secs(seconds)));
    }

    let date = httpdate::parse_http_date(value)
        .inspect_err(|_| debug!(header_value, "unparseable Retry-After value"))
        .ok()?;
    let wait = date
        .duration_since(std::time::SystemTime::now())
        .unwrap_or(Duration::ZERO);
    Some(cap_retry_after(wait))
}

fn cap_retry_after(wait: Duration) -> Duration {
    if wait > MAX_RETRY_AFTER {
        warn!(
            wait_secs = wait.as_secs(),
            cap_secs = MAX_RETRY_AFTER.as_secs(),
            "Retry-After exceeds maximum, capping"
        );
        MAX_RETRY_AFTER
    } else {
        wait
    }
}
