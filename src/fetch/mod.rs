//! HTTP text-fetch layer.
//!
//! One capability: fetch a URL's body as text, with classification of every
//! failure into [`FetchError`] variants the extraction chain can map onto
//! page statuses. Transient failures (timeouts, 5xx, 429) are retried here
//! with exponential backoff before the error ever reaches the chain; the
//! orchestrator's link-level retry only reacts to whole-attempt timeouts.

mod client;
mod error;
mod retry;

pub use client::{CONNECT_TIMEOUT_SECS, HttpClient, READ_TIMEOUT_SECS};
pub use error::FetchError;
pub use retry::{DEFAULT_FETCH_ATTEMPTS, FailureType, RetryDecision, RetryPolicy, parse_retry_after};
