//! Crawler Core Library
//!
//! Same-domain web crawler: give it a seed URL and it maps the site into
//! page/link records, honoring robots.txt and politeness delays, with a
//! rendered-DOM fallback for script-built pages.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`crawl`] - Orchestration: spider, worker pool, frontier, throttle
//! - [`fetch`] - HTTP text fetching with retry and error classification
//! - [`parse`] - Link extraction strategies and the fallback chain
//! - [`robots`] - robots.txt retrieval and rule evaluation
//! - [`db`] / [`store`] - SQLite persistence for jobs and pages
//! - [`sink`] - Result delivery (console, store)
//! - [`jobs`] - Job lifecycle runner

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod crawl;
pub mod db;
pub mod fetch;
pub mod jobs;
pub mod parse;
pub mod robots;
pub mod sink;
pub mod store;
pub mod user_agent;

// Re-export commonly used types
pub use crawl::{CrawlError, CrawlOptions, Link, Page, PageStatus, PolitenessThrottle, Spider};
pub use db::Database;
pub use fetch::{FetchError, HttpClient};
pub use jobs::JobRunner;
pub use parse::{
    BrowserProvider, DEFAULT_WEBDRIVER_URL, ExtractRequest, ExtractionStrategy, ParserService,
    RenderedHtmlParser, StaticHtmlParser,
};
pub use robots::{RobotsRules, RobotsService};
pub use sink::{ConsoleSink, ResultSink, SinkError, StoreSink};
pub use store::{Job, JobStatus, JobStore, PageRow, PageStore, StoreError};
