//! Constants for the crawl module (pool sizing, bounds, timeouts).

/// Default worker pool size.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default maximum crawl depth below the seed.
pub const DEFAULT_MAX_DEPTH: u32 = 1;

/// Default per-link retry bound for timed-out extraction attempts.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Default wall-clock budget for one extraction attempt (seconds).
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
