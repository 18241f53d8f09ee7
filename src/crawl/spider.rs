//! Crawl orchestration.
//!
//! The [`Spider`] drives one crawl run: it resolves robots rules for the
//! seed host, configures the politeness throttle, seeds the frontier, and
//! runs a fixed pool of workers until the queue closes. Workers apply the
//! depth and robots policy, run the extraction chain under a per-attempt
//! timeout, record page results, and feed newly discovered same-host
//! links back into the frontier.

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::crawl::error::CrawlError;
use crate::crawl::session::CrawlSession;
use crate::crawl::throttle::PolitenessThrottle;
use crate::crawl::types::{CrawlOptions, Link, Page, PageStatus};
use crate::parse::{ExtractRequest, ParserService, sanitize_url};
use crate::robots::{RobotsRules, RobotsService};
use crate::user_agent::AGENT_NAME;

/// Crawl orchestrator. Owns the worker pool for a run.
pub struct Spider {
    parser: Arc<ParserService>,
    robots: RobotsService,
    throttle: Arc<PolitenessThrottle>,
    options: CrawlOptions,
}

/// Everything a worker needs, shared across the pool.
struct WorkerContext {
    session: CrawlSession,
    parser: Arc<ParserService>,
    throttle: Arc<PolitenessThrottle>,
    rules: RobotsRules,
    options: CrawlOptions,
    root_host: String,
    job_id: Uuid,
}

impl Spider {
    /// Creates a spider over the given collaborators.
    #[must_use]
    pub fn new(
        parser: Arc<ParserService>,
        robots: RobotsService,
        throttle: Arc<PolitenessThrottle>,
        options: CrawlOptions,
    ) -> Self {
        Self {
            parser,
            robots,
            throttle,
            options,
        }
    }

    /// Crawls from `root_url` to completion and returns every recorded
    /// page. The result set is unordered.
    ///
    /// # Errors
    ///
    /// Returns [`CrawlError::InvalidSeed`] when the seed URL is not a
    /// crawlable http(s) URL, and [`CrawlError::Worker`] if a worker task
    /// panics.
    #[instrument(skip(self, root_url), fields(root = %root_url, %job_id))]
    pub async fn crawl(&self, root_url: &str, job_id: Uuid) -> Result<Vec<Page>, CrawlError> {
        // the seed goes through the same normalization as discovered
        // links, so the visited-set treats "…/" and "…" as one URL
        let Some(root_url) = sanitize_url(root_url, root_url) else {
            return Err(CrawlError::invalid_seed(
                root_url,
                "not a crawlable http(s) URL",
            ));
        };
        let base = Url::parse(&root_url)
            .map_err(|error| CrawlError::invalid_seed(&root_url, error.to_string()))?;
        let root_host = base
            .host_str()
            .ok_or_else(|| CrawlError::invalid_seed(&root_url, "URL has no host"))?
            .to_string();
        let started = tokio::time::Instant::now();

        // the robots fetch goes through the throttle's accounting too,
        // even though no delay can be configured for the host yet
        self.throttle.enforce(&root_host).await;
        let rules = self.robots.get_rules(&root_url, AGENT_NAME).await;

        let delay_ms = if rules.delay_ms > 0 {
            rules.delay_ms
        } else {
            self.options.default_politeness_ms
        };
        if delay_ms > 0 {
            self.throttle.set_delay(&root_host, delay_ms);
        }

        info!(
            host = %root_host,
            delay_ms,
            workers = self.options.concurrency,
            max_depth = self.options.max_depth,
            "starting crawl"
        );

        let context = Arc::new(WorkerContext {
            session: CrawlSession::new(),
            parser: Arc::clone(&self.parser),
            throttle: Arc::clone(&self.throttle),
            rules,
            options: self.options.clone(),
            root_host: root_host.clone(),
            job_id,
        });

        context.session.mark_visited(&root_url);
        context
            .session
            .enqueue(Link::new(&root_url, &root_host, 0))
            .await;

        let workers: Vec<_> = (0..self.options.concurrency.max(1))
            .map(|worker_id| {
                let context = Arc::clone(&context);
                tokio::spawn(run_worker(context, worker_id))
            })
            .collect();

        for worker in workers {
            worker
                .await
                .map_err(|source| CrawlError::Worker { source })?;
        }

        let pages = context.session.take_pages().await;
        info!(
            pages = pages.len(),
            visited = context.session.visited_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "crawl complete"
        );
        Ok(pages)
    }
}

/// One pool slot: drains the frontier until the queue closes.
async fn run_worker(context: Arc<WorkerContext>, worker_id: usize) {
    debug!(worker_id, "worker started");

    while let Some(link) = context.session.next_link().await {
        process_link(&context, &link).await;

        // the dequeued link is now fully resolved, re-enqueues included
        let remaining = context.session.finish_link();
        debug!(worker_id, url = %link.url, remaining, "finished link");
        if remaining == 0 {
            context.session.close_queue().await;
        }
    }

    debug!(worker_id, "worker stopped");
}

/// Handles one dequeued link: policy checks, extraction, result
/// recording, and frontier expansion.
async fn process_link(context: &WorkerContext, link: &Link) {
    if link.depth > context.options.max_depth {
        return;
    }

    let path = match Url::parse(&link.url) {
        Ok(url) => url.path().to_string(),
        Err(error) => {
            warn!(url = %link.url, %error, "dequeued link failed to parse, dropping");
            return;
        }
    };

    if !context.rules.is_allowed(&path) {
        debug!(url = %link.url, "disallowed by robots, recording without fetching");
        context
            .session
            .record_page(Page::new(
                &link.url,
                &link.domain,
                link.depth,
                Vec::new(),
                PageStatus::Disallowed,
                context.job_id,
            ))
            .await;
        return;
    }

    context.throttle.enforce(&link.domain).await;

    info!(url = %link.url, depth = link.depth, "crawling");
    let request = ExtractRequest::new(&link.url, &context.root_host);

    match timeout(
        context.options.fetch_timeout,
        context.parser.parse_links(&request),
    )
    .await
    {
        Ok(response) => {
            record_and_expand(context, link, response.links, response.status).await;
        }
        Err(_) if link.retries < context.options.max_retries => {
            warn!(
                url = %link.url,
                retries = link.retries,
                "extraction attempt timed out, re-queueing"
            );
            context.session.unmark_visited(&link.url);
            context.session.enqueue(link.retry()).await;
        }
        Err(_) => {
            // exhaustion is a silent give-up: no page is recorded
            warn!(
                url = %link.url,
                retries = link.retries,
                "extraction timed out past the retry bound, dropping"
            );
        }
    }
}

/// Records the page for a processed link, then offers each discovered
/// link to the frontier. The page always lands before any child is
/// marked visited.
async fn record_and_expand(
    context: &WorkerContext,
    link: &Link,
    links: Vec<String>,
    status: PageStatus,
) {
    context
        .session
        .record_page(Page::new(
            &link.url,
            &link.domain,
            link.depth,
            links.clone(),
            status,
            context.job_id,
        ))
        .await;

    let child_depth = link.depth + 1;
    if child_depth > context.options.max_depth {
        return;
    }

    for child in links {
        let Ok(child_url) = Url::parse(&child) else {
            warn!(url = %child, "discovered link failed to parse, skipping");
            continue;
        };
        if child_url.host_str() != Some(context.root_host.as_str()) {
            continue;
        }

        if !context.rules.is_allowed(child_url.path()) {
            // disallowed children are recorded even though never fetched
            if context.session.mark_visited(&child) {
                debug!(url = %child, "child disallowed by robots, recording");
                context
                    .session
                    .record_page(Page::new(
                        &child,
                        &context.root_host,
                        child_depth,
                        Vec::new(),
                        PageStatus::Disallowed,
                        context.job_id,
                    ))
                    .await;
            }
            continue;
        }

        if context.session.mark_visited(&child) {
            context
                .session
                .enqueue(Link::new(child, &context.root_host, child_depth))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::HttpClient;

    fn spider() -> Spider {
        Spider::new(
            Arc::new(ParserService::new(Vec::new())),
            RobotsService::new(HttpClient::new()),
            Arc::new(PolitenessThrottle::new()),
            CrawlOptions::default(),
        )
    }

    // ==================== Seed Validation Tests ====================

    #[tokio::test]
    async fn test_crawl_rejects_unparseable_seed() {
        let result = spider().crawl("not a url", Uuid::new_v4()).await;
        assert!(matches!(result, Err(CrawlError::InvalidSeed { .. })));
    }

    #[tokio::test]
    async fn test_crawl_rejects_non_http_seed() {
        let result = spider().crawl("ftp://example.com/", Uuid::new_v4()).await;
        assert!(matches!(result, Err(CrawlError::InvalidSeed { .. })));
    }

    #[tokio::test]
    async fn test_crawl_rejects_fragment_seed() {
        let result = spider().crawl("#top", Uuid::new_v4()).await;
        assert!(matches!(result, Err(CrawlError::InvalidSeed { .. })));
    }
}
