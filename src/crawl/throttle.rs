//! Per-domain politeness throttle.
//!
//! Enforces the minimum spacing between requests to the same domain, as
//! required by robots.txt `Crawl-delay` or a configured default. Delays are
//! tracked per domain, so requests to different domains never wait on each
//! other; only subsequent requests to the *same* domain are held back.
//!
//! The throttle re-bases its window from "now" at the end of every
//! [`PolitenessThrottle::enforce`] call, whether or not a wait occurred, so
//! a caller that shows up late cannot burst through several accumulated
//! slots at once.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Warning threshold for cumulative wait per domain (30 seconds).
const CUMULATIVE_WAIT_WARNING_THRESHOLD: Duration = Duration::from_secs(30);

/// Per-domain politeness throttle.
///
/// Designed to be wrapped in `Arc` and shared by every worker in the pool.
/// Uses `DashMap` for concurrent per-domain state and a `tokio::sync::Mutex`
/// per domain for atomic read-update of the last-request time.
#[derive(Debug, Default)]
pub struct PolitenessThrottle {
    /// Per-domain state tracking.
    /// Uses Arc to allow cloning the state and releasing the `DashMap` lock
    /// before awaiting on the inner Mutex (prevents shard lock across await).
    domains: DashMap<String, Arc<DomainState>>,
}

/// State tracked for each domain.
#[derive(Debug)]
struct DomainState {
    /// Required delay between requests, milliseconds. Zero means none
    /// configured; `enforce` is then a no-op for this domain.
    delay_ms: AtomicU64,

    /// Time of the last request to this domain. `None` until the first
    /// enforced request goes through.
    last_request: Mutex<Option<Instant>>,

    /// Cumulative wait applied to this domain, for excessive-wait warnings.
    cumulative_wait_ms: AtomicU64,
}

impl DomainState {
    fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms: AtomicU64::new(delay_ms),
            last_request: Mutex::new(None),
            cumulative_wait_ms: AtomicU64::new(0),
        }
    }

    /// Adds to the cumulative wait and returns the new total.
    fn add_cumulative_wait(&self, wait: Duration) -> Duration {
        let wait_ms = wait.as_millis() as u64;
        let new_total = self.cumulative_wait_ms.fetch_add(wait_ms, Ordering::SeqCst) + wait_ms;
        Duration::from_millis(new_total)
    }
}

impl PolitenessThrottle {
    /// Creates a throttle with no delays configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the required delay for a domain, in milliseconds.
    ///
    /// A zero delay clears the requirement; `enforce` becomes a no-op for
    /// that domain again.
    #[instrument(skip(self))]
    pub fn set_delay(&self, domain: &str, delay_ms: u64) {
        debug!("configuring politeness delay");
        self.domains
            .entry(domain.to_string())
            .or_insert_with(|| Arc::new(DomainState::new(0)))
            .delay_ms
            .store(delay_ms, Ordering::SeqCst);
    }

    /// Returns the configured delay for a domain, if any.
    #[must_use]
    pub fn delay_for(&self, domain: &str) -> Option<Duration> {
        self.domains
            .get(domain)
            .map(|state| state.delay_ms.load(Ordering::SeqCst))
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }

    /// Suspends the caller until a request to `domain` is polite.
    ///
    /// No-op when no delay is configured for the domain. Otherwise waits
    /// out `delay - elapsed_since_last_request` when positive, then
    /// unconditionally re-bases the domain's window from "now".
    #[instrument(skip(self))]
    pub async fn enforce(&self, domain: &str) {
        // Clone the Arc out to release the DashMap shard before awaiting
        let Some(state) = self.domains.get(domain).map(|entry| entry.value().clone()) else {
            return;
        };

        let delay_ms = state.delay_ms.load(Ordering::SeqCst);
        if delay_ms == 0 {
            return;
        }
        let delay = Duration::from_millis(delay_ms);

        let mut last_request_guard = state.last_request.lock().await;

        if let Some(last_request) = *last_request_guard {
            let elapsed = last_request.elapsed();

            if elapsed < delay {
                let wait = delay.saturating_sub(elapsed);
                let cumulative = state.add_cumulative_wait(wait);

                debug!(
                    wait_ms = wait.as_millis() as u64,
                    cumulative_ms = cumulative.as_millis() as u64,
                    "throttling request"
                );

                if cumulative >= CUMULATIVE_WAIT_WARNING_THRESHOLD {
                    warn!(
                        cumulative_wait_secs = cumulative.as_secs(),
                        "excessive politeness waiting - crawl-delay dominates crawl time"
                    );
                }

                tokio::time::sleep(wait).await;
            }
        } else {
            debug!("first request to domain - no wait");
        }

        // Re-base the window from now, wait or no wait
        *last_request_guard = Some(Instant::now());
    }
}
