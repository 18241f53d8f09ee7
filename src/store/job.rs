//! Job rows and lifecycle transitions.

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::instrument;
use uuid::Uuid;

use super::{Result, check_affected};
use crate::db::Database;

/// Lifecycle state of a crawl job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Accepted but not yet started.
    Created,
    /// Crawl currently running.
    InProgress,
    /// Crawl finished and results stored.
    Completed,
    /// Crawl aborted with an error.
    Failed,
}

impl JobStatus {
    /// Returns the database string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("invalid job status: {s}")),
        }
    }
}

/// One crawl job row.
#[derive(Debug, Clone, FromRow)]
pub struct Job {
    /// Job identifier (UUID, stored as text).
    pub job_id: String,
    /// Current lifecycle status (stored as text, parsed via `status()`).
    #[sqlx(rename = "status")]
    pub status_str: String,
    /// Seed URL the job was submitted with.
    pub url: String,
    /// When the crawl started.
    pub started_at: Option<String>,
    /// When the job reached a terminal status.
    pub completed_at: Option<String>,
    /// Failure message for failed jobs.
    pub error: Option<String>,
}

impl Job {
    /// Returns the parsed status enum.
    ///
    /// Falls back to `Created` if the status string is invalid.
    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status_str.parse().unwrap_or(JobStatus::Created)
    }
}

/// Job lifecycle store.
///
/// One row per submitted crawl, moved through
/// created → `in_progress` → completed/failed.
#[derive(Debug, Clone)]
pub struct JobStore {
    db: Database,
}

impl JobStore {
    /// Creates a job store over the given database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts a new job in `created` status.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`](super::StoreError::Database) if the
    /// insert fails, including when the job id already exists.
    #[instrument(skip(self), fields(%job_id, url = %url))]
    pub async fn create_job(&self, job_id: Uuid, url: &str) -> Result<()> {
        sqlx::query(r"INSERT INTO jobs (job_id, status, url) VALUES (?, ?, ?)")
            .bind(job_id.to_string())
            .bind(JobStatus::Created.as_str())
            .bind(url)
            .execute(self.db.pool())
            .await?;

        Ok(())
    }

    /// Transitions a job to `in_progress` and stamps its start time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::JobNotFound`](super::StoreError::JobNotFound)
    /// if no job exists with the given id.
    #[instrument(skip(self), fields(%job_id))]
    pub async fn mark_in_progress(&self, job_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r"UPDATE jobs
              SET status = ?, started_at = datetime('now')
              WHERE job_id = ?",
        )
        .bind(JobStatus::InProgress.as_str())
        .bind(job_id.to_string())
        .execute(self.db.pool())
        .await?;

        check_affected(job_id, result.rows_affected())
    }

    /// Transitions a job to `completed` and stamps its completion time.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::JobNotFound`](super::StoreError::JobNotFound)
    /// if no job exists with the given id.
    #[instrument(skip(self), fields(%job_id))]
    pub async fn mark_completed(&self, job_id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r"UPDATE jobs
              SET status = ?, completed_at = datetime('now')
              WHERE job_id = ?",
        )
        .bind(JobStatus::Completed.as_str())
        .bind(job_id.to_string())
        .execute(self.db.pool())
        .await?;

        check_affected(job_id, result.rows_affected())
    }

    /// Transitions a job to `failed` with the failure message.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::JobNotFound`](super::StoreError::JobNotFound)
    /// if no job exists with the given id.
    #[instrument(skip(self), fields(%job_id, error = %error))]
    pub async fn mark_failed(&self, job_id: Uuid, error: &str) -> Result<()> {
        let result = sqlx::query(
            r"UPDATE jobs
              SET status = ?, error = ?, completed_at = datetime('now')
              WHERE job_id = ?",
        )
        .bind(JobStatus::Failed.as_str())
        .bind(error)
        .bind(job_id.to_string())
        .execute(self.db.pool())
        .await?;

        check_affected(job_id, result.rows_affected())
    }

    /// Gets a job row by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`](super::StoreError::Database) if the
    /// query fails.
    #[instrument(skip(self), fields(%job_id))]
    pub async fn get_job(&self, job_id: Uuid) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(r"SELECT * FROM jobs WHERE job_id = ?")
            .bind(job_id.to_string())
            .fetch_optional(self.db.pool())
            .await?;

        Ok(job)
    }

    /// Lists all jobs, most recently submitted first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`](super::StoreError::Database) if the
    /// query fails.
    #[instrument(skip(self))]
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>(r"SELECT * FROM jobs ORDER BY rowid DESC")
            .fetch_all(self.db.pool())
            .await?;

        Ok(jobs)
    }
}
