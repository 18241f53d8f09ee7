//! Page rows: persisted crawl results.

use sqlx::FromRow;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::Result;
use crate::crawl::{Page, PageStatus};
use crate::db::Database;

/// One stored page outcome.
#[derive(Debug, Clone, FromRow)]
pub struct PageRow {
    /// Row identifier.
    pub id: i64,
    /// Owning job (UUID, stored as text).
    pub job_id: String,
    /// Canonical page URL.
    pub page_url: String,
    /// Host the page belongs to.
    pub domain: String,
    /// Link depth below the seed.
    pub depth: i64,
    /// Outbound links as a JSON array of URLs.
    pub links: String,
    /// Outcome status (stored as text, parsed via `status()`).
    #[sqlx(rename = "status")]
    pub status_str: String,
    /// When the page was processed, RFC 3339.
    pub last_modified: String,
}

impl PageRow {
    /// Returns the parsed status enum.
    ///
    /// Falls back to `UnknownError` if the stored string is invalid.
    #[must_use]
    pub fn status(&self) -> PageStatus {
        self.status_str.parse().unwrap_or(PageStatus::UnknownError)
    }

    /// Returns the decoded outbound link list.
    ///
    /// Invalid JSON decodes as an empty list.
    #[must_use]
    pub fn link_list(&self) -> Vec<String> {
        serde_json::from_str(&self.links).unwrap_or_default()
    }
}

/// Page result store.
///
/// Holds every recorded page outcome, scoped to the job that produced it.
#[derive(Debug, Clone)]
pub struct PageStore {
    db: Database,
}

impl PageStore {
    /// Creates a page store over the given database.
    #[must_use]
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Inserts every page of one crawl in a single transaction.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`](super::StoreError::Database) if any
    /// insert or the commit fails; nothing is written in that case.
    #[instrument(skip(self, pages), fields(%job_id, pages = pages.len()))]
    pub async fn insert_pages(&self, job_id: Uuid, pages: &[Page]) -> Result<usize> {
        let mut tx = self.db.pool().begin().await?;

        for page in pages {
            let links =
                serde_json::to_string(&page.links).unwrap_or_else(|_| String::from("[]"));
            sqlx::query(
                r"INSERT INTO pages (job_id, page_url, domain, depth, links, status, last_modified)
                  VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(job_id.to_string())
            .bind(&page.page_url)
            .bind(&page.domain)
            .bind(i64::from(page.depth))
            .bind(links)
            .bind(page.status.as_str())
            .bind(page.last_modified.to_rfc3339())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(rows = pages.len(), "pages stored");
        Ok(pages.len())
    }

    /// Returns the pages of a job, optionally filtered to a status set.
    ///
    /// Rows come back shallow-to-deep, then by URL, so the output reads as
    /// a sitemap.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`](super::StoreError::Database) if the
    /// query fails.
    #[instrument(skip(self, statuses), fields(%job_id))]
    pub async fn sitemap(
        &self,
        job_id: Uuid,
        statuses: Option<&[PageStatus]>,
    ) -> Result<Vec<PageRow>> {
        let Some(statuses) = statuses.filter(|s| !s.is_empty()) else {
            let rows = sqlx::query_as::<_, PageRow>(
                r"SELECT * FROM pages
                  WHERE job_id = ?
                  ORDER BY depth ASC, page_url ASC",
            )
            .bind(job_id.to_string())
            .fetch_all(self.db.pool())
            .await?;
            return Ok(rows);
        };

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT * FROM pages
             WHERE job_id = ? AND status IN ({placeholders})
             ORDER BY depth ASC, page_url ASC"
        );

        let mut query = sqlx::query_as::<_, PageRow>(&sql).bind(job_id.to_string());
        for status in statuses {
            query = query.bind(status.as_str());
        }

        Ok(query.fetch_all(self.db.pool()).await?)
    }

    /// Counts stored pages for a job.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`](super::StoreError::Database) if the
    /// query fails.
    #[instrument(skip(self), fields(%job_id))]
    pub async fn page_count(&self, job_id: Uuid) -> Result<i64> {
        let result: (i64,) =
            sqlx::query_as(r"SELECT COUNT(*) FROM pages WHERE job_id = ?")
                .bind(job_id.to_string())
                .fetch_one(self.db.pool())
                .await?;

        Ok(result.0)
    }
}
