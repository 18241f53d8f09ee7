//! Crawl orchestration layer.
//!
//! A [`Spider`] runs one crawl: robots resolution for the seed host, a
//! politeness-throttled worker pool over a shared frontier queue, and the
//! per-link policy (depth bound, robots, visited-set, timeout retries).
//! The crawl is done when every enqueued link has been fully processed;
//! the worker that resolves the last one closes the queue and the pool
//! drains out. Results come back as a flat list of [`Page`] records.

mod constants;
mod error;
mod session;
mod spider;
mod throttle;
mod types;

pub use constants::{
    DEFAULT_CONCURRENCY, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_DEPTH, DEFAULT_MAX_RETRIES,
};
pub use error::CrawlError;
pub use spider::Spider;
pub use throttle::PolitenessThrottle;
pub use types::{CrawlOptions, Link, Page, PageStatus};
