//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crawler_core::crawl::{
    DEFAULT_CONCURRENCY, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_DEPTH, DEFAULT_MAX_RETRIES,
};
use crawler_core::parse::DEFAULT_WEBDRIVER_URL;
use crawler_core::PageStatus;

/// Map a website into page/link records.
///
/// Crawler walks every same-host page reachable from a seed URL, honoring
/// robots.txt, and records one entry per page with its outbound links and
/// outcome status.
#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// SQLite database holding jobs and recorded pages
    #[arg(long, global = true, default_value = "crawler.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Crawl a site and record its page map
    Crawl(CrawlArgs),
    /// Show a job's lifecycle row, or list known jobs
    Status(StatusArgs),
    /// Print the recorded pages of a job
    Sitemap(SitemapArgs),
}

#[derive(clap::Args, Debug)]
pub struct CrawlArgs {
    /// Seed URL to crawl (same-host links only)
    pub url: String,

    /// Maximum link depth below the seed (0-10)
    #[arg(short = 'd', long, default_value_t = DEFAULT_MAX_DEPTH, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub max_depth: u32,

    /// Maximum re-queues for a link whose extraction times out (0-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_RETRIES, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub max_retries: u32,

    /// Number of concurrent crawl workers (1-64)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=64))]
    pub concurrency: u8,

    /// Wall-clock budget per extraction attempt in seconds (1-300)
    #[arg(short = 't', long, default_value_t = DEFAULT_FETCH_TIMEOUT_SECS, value_parser = clap::value_parser!(u64).range(1..=300))]
    pub timeout: u64,

    /// Delay between same-domain requests in milliseconds when robots.txt
    /// sets no Crawl-delay (0 to disable, max 60000)
    #[arg(short = 'l', long, default_value_t = 0, value_parser = clap::value_parser!(u64).range(0..=60000))]
    pub politeness: u64,

    /// WebDriver endpoint for the rendered-DOM fallback
    #[arg(long, default_value = DEFAULT_WEBDRIVER_URL)]
    pub webdriver_url: String,

    /// Disable the rendered-DOM fallback (static extraction only)
    #[arg(long)]
    pub no_render: bool,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Job id printed when the crawl was submitted (omit to list all jobs,
    /// newest first)
    pub job_id: Option<Uuid>,
}

#[derive(clap::Args, Debug)]
pub struct SitemapArgs {
    /// Job id printed when the crawl was submitted
    pub job_id: Uuid,

    /// Only include pages with these statuses (comma-separated, e.g.
    /// ok,no_links_found,disallowed)
    #[arg(long, value_delimiter = ',')]
    pub status: Vec<PageStatus>,

    /// Emit the page list as JSON instead of text
    #[arg(long)]
    pub json: bool,
}
