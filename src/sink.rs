//! Result sinks: where a finished crawl delivers its pages.
//!
//! The job runner hands every configured sink the complete page set
//! exactly once, after the crawl finishes. [`ConsoleSink`] prints a
//! human-readable summary; [`StoreSink`] persists the pages for the
//! `status`/`sitemap` query surface.

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::crawl::Page;
use crate::store::{PageStore, StoreError};

/// Errors a sink can raise while handling results.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Persisting pages to the store failed.
    #[error("failed to store crawl results: {0}")]
    Store(#[from] StoreError),
}

/// Consumer of a finished crawl's page set.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Delivers the pages recorded for `job_id`.
    async fn handle(&self, job_id: Uuid, pages: &[Page]) -> Result<(), SinkError>;
}

/// Prints one line per page and a count-by-status summary to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

#[async_trait]
impl ResultSink for ConsoleSink {
    async fn handle(&self, job_id: Uuid, pages: &[Page]) -> Result<(), SinkError> {
        println!("Crawl {job_id}: {} pages", pages.len());
        for page in pages {
            println!(
                "  [{:>15}] depth {}  {} ({} links)",
                page.status,
                page.depth,
                page.page_url,
                page.links.len()
            );
        }

        // BTreeMap keeps the summary ordering stable across runs
        let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
        for page in pages {
            *by_status.entry(page.status.as_str()).or_insert(0) += 1;
        }
        if !by_status.is_empty() {
            let summary = by_status
                .iter()
                .map(|(status, count)| format!("{status}: {count}"))
                .collect::<Vec<_>>()
                .join(", ");
            println!("  {summary}");
        }

        Ok(())
    }
}

/// Persists the page set through a [`PageStore`].
#[derive(Debug, Clone)]
pub struct StoreSink {
    pages: PageStore,
}

impl StoreSink {
    /// Creates a sink writing to the given page store.
    #[must_use]
    pub fn new(pages: PageStore) -> Self {
        Self { pages }
    }
}

#[async_trait]
impl ResultSink for StoreSink {
    async fn handle(&self, job_id: Uuid, pages: &[Page]) -> Result<(), SinkError> {
        debug!(%job_id, pages = pages.len(), "persisting crawl results");
        let written = self.pages.insert_pages(job_id, pages).await?;
        info!(%job_id, written, "crawl results stored");
        Ok(())
    }
}
