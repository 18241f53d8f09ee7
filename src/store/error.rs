//! Error types for store operations.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during job/page store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No job exists with the given id.
    #[error("job not found: {0}\n  Suggestion: run `crawler status` to list known jobs")]
    JobNotFound(Uuid),
}
