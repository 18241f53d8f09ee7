//! Crawl job lifecycle.
//!
//! A [`JobRunner`] takes a submitted job from `created` through
//! `in_progress` to `completed` or `failed`, recording every transition
//! in the job store. Only orchestration-level failure marks a job
//! `failed`; individual pages that error are ordinary results.

use std::sync::Arc;

use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::crawl::{Page, Spider};
use crate::parse::BrowserProvider;
use crate::sink::{ResultSink, SinkError};
use crate::store::{JobStatus, JobStore, StoreError};

/// Runs submitted crawl jobs end to end.
pub struct JobRunner {
    spider: Spider,
    jobs: JobStore,
    sinks: Vec<Arc<dyn ResultSink>>,
    browser: Option<Arc<BrowserProvider>>,
}

impl JobRunner {
    /// Creates a runner over the given spider, job store, and sinks.
    /// Sinks are invoked in the order given.
    #[must_use]
    pub fn new(spider: Spider, jobs: JobStore, sinks: Vec<Arc<dyn ResultSink>>) -> Self {
        Self {
            spider,
            jobs,
            sinks,
            browser: None,
        }
    }

    /// Attaches a browser session for the runner to shut down once the
    /// job reaches a terminal status.
    #[must_use]
    pub fn with_browser(mut self, browser: Arc<BrowserProvider>) -> Self {
        self.browser = Some(browser);
        self
    }

    /// Creates the job row and returns the new job id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the job row cannot be created.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn submit(&self, url: &str) -> Result<Uuid, StoreError> {
        let job_id = Uuid::new_v4();
        self.jobs.create_job(job_id, url).await?;
        info!(%job_id, "job created");
        Ok(job_id)
    }

    /// Runs a submitted job to a terminal status and returns it.
    ///
    /// The crawl result (or the failure message) is recorded in the job
    /// row either way; an attached browser session is shut down before
    /// returning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only when a lifecycle transition itself
    /// cannot be recorded. Crawl and sink failures are captured in the
    /// job row and reported as [`JobStatus::Failed`].
    #[instrument(skip(self, url), fields(%job_id, url = %url))]
    pub async fn run(&self, job_id: Uuid, url: &str) -> Result<JobStatus, StoreError> {
        self.jobs.mark_in_progress(job_id).await?;
        info!("job started");

        let status = match self.spider.crawl(url, job_id).await {
            Ok(pages) => match self.deliver(job_id, &pages).await {
                Ok(()) => {
                    self.jobs.mark_completed(job_id).await?;
                    JobStatus::Completed
                }
                Err(sink_error) => {
                    error!(%sink_error, "result delivery failed");
                    self.jobs
                        .mark_failed(job_id, &sink_error.to_string())
                        .await?;
                    JobStatus::Failed
                }
            },
            Err(crawl_error) => {
                error!(%crawl_error, "crawl failed");
                self.jobs
                    .mark_failed(job_id, &crawl_error.to_string())
                    .await?;
                JobStatus::Failed
            }
        };

        if let Some(browser) = &self.browser {
            browser.shutdown().await;
        }

        info!(%status, "job finished");
        Ok(status)
    }

    async fn deliver(&self, job_id: Uuid, pages: &[Page]) -> Result<(), SinkError> {
        for sink in &self.sinks {
            sink.handle(job_id, pages).await?;
        }
        Ok(())
    }
}
