//! CLI entry point for the crawler.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crawler_core::{
    BrowserProvider, ConsoleSink, CrawlOptions, Database, ExtractionStrategy, HttpClient,
    JobRunner, JobStatus, JobStore, PageStore, ParserService, PolitenessThrottle,
    RenderedHtmlParser, ResultSink, RobotsService, Spider, StaticHtmlParser, StoreSink,
};
use tracing::{debug, info};

mod cli;

use cli::{Args, Command, CrawlArgs, SitemapArgs, StatusArgs};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    match args.command {
        Command::Crawl(crawl) => run_crawl(&args.db, crawl).await,
        Command::Status(status) => show_status(&args.db, &status).await,
        Command::Sitemap(sitemap) => show_sitemap(&args.db, &sitemap).await,
    }
}

/// Submits a crawl job, runs it to a terminal status, and prints the
/// console summary.
async fn run_crawl(db_path: &Path, crawl: CrawlArgs) -> Result<()> {
    let db = Database::new(db_path).await?;
    let jobs = JobStore::new(db.clone());
    let page_store = PageStore::new(db.clone());

    let client = HttpClient::new();
    let robots = RobotsService::new(client.clone());
    let throttle = Arc::new(PolitenessThrottle::new());

    // Strategy order is the fallback order: cheap static extraction
    // first, the browser only for script-built pages
    let mut strategies: Vec<Arc<dyn ExtractionStrategy>> =
        vec![Arc::new(StaticHtmlParser::new(client.clone()))];
    let mut browser = None;
    if crawl.no_render {
        info!("rendered-DOM fallback disabled");
    } else {
        let provider = Arc::new(BrowserProvider::new(&crawl.webdriver_url));
        strategies.push(Arc::new(RenderedHtmlParser::new(
            client.clone(),
            Arc::clone(&provider),
        )));
        browser = Some(provider);
    }
    let parser = Arc::new(ParserService::new(strategies));

    let options = CrawlOptions {
        max_depth: crawl.max_depth,
        max_retries: crawl.max_retries,
        concurrency: usize::from(crawl.concurrency),
        fetch_timeout: Duration::from_secs(crawl.timeout),
        default_politeness_ms: crawl.politeness,
    };
    let spider = Spider::new(parser, robots, throttle, options);

    let sinks: Vec<Arc<dyn ResultSink>> = vec![
        Arc::new(StoreSink::new(page_store)),
        Arc::new(ConsoleSink),
    ];
    let mut runner = JobRunner::new(spider, jobs.clone(), sinks);
    if let Some(provider) = browser {
        runner = runner.with_browser(provider);
    }

    let job_id = runner.submit(&crawl.url).await?;
    println!("Job {job_id}");

    let status = runner.run(job_id, &crawl.url).await?;
    info!(%job_id, %status, "crawl job finished");

    if status == JobStatus::Failed {
        let detail = jobs.get_job(job_id).await?.and_then(|job| job.error);
        db.close().await;
        anyhow::bail!(
            "crawl job {job_id} failed: {}",
            detail.unwrap_or_else(|| "unknown error".into())
        );
    }

    db.close().await;
    Ok(())
}

/// Prints the stored lifecycle row for one job, or lists every known job
/// (newest first) when no id was given.
async fn show_status(db_path: &Path, status: &StatusArgs) -> Result<()> {
    let db = Database::new(db_path).await?;
    let jobs = JobStore::new(db.clone());

    let Some(job_id) = status.job_id else {
        let known = jobs.list_jobs().await?;
        if known.is_empty() {
            println!("No crawl jobs recorded yet.");
        } else {
            for job in &known {
                println!("{}  {:<12} {}", job.job_id, job.status(), job.url);
            }
        }
        db.close().await;
        return Ok(());
    };

    let Some(job) = jobs.get_job(job_id).await? else {
        db.close().await;
        anyhow::bail!("no job found with id {job_id}");
    };

    println!("Job {}", job.job_id);
    println!("  status:    {}", job.status());
    println!("  url:       {}", job.url);
    if let Some(started) = &job.started_at {
        println!("  started:   {started}");
    }
    if let Some(completed) = &job.completed_at {
        println!("  completed: {completed}");
    }
    if let Some(error) = &job.error {
        println!("  error:     {error}");
    }

    db.close().await;
    Ok(())
}

/// Prints the recorded pages of a job, optionally filtered and as JSON.
async fn show_sitemap(db_path: &Path, sitemap: &SitemapArgs) -> Result<()> {
    let db = Database::new(db_path).await?;
    let pages = PageStore::new(db.clone());

    let filter = (!sitemap.status.is_empty()).then_some(sitemap.status.as_slice());
    let rows = pages.sitemap(sitemap.job_id, filter).await?;

    if sitemap.json {
        let entries: Vec<_> = rows
            .iter()
            .map(|row| {
                serde_json::json!({
                    "page_url": row.page_url,
                    "domain": row.domain,
                    "depth": row.depth,
                    "status": row.status().as_str(),
                    "links": row.link_list(),
                    "last_modified": row.last_modified,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if rows.is_empty() {
        println!("No pages recorded for job {}", sitemap.job_id);
    } else {
        for row in &rows {
            println!(
                "[{:>15}] depth {}  {} ({} links)",
                row.status(),
                row.depth,
                row.page_url,
                row.link_list().len()
            );
        }
    }

    db.close().await;
    Ok(())
}
