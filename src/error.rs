use std::path::PathBuf;

use thiserror::Error;

use crate::jobs::TaskId;

/// Failures of the raw file primitives used by backup and restore jobs.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("failed to copy {} to {}: {source}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read database version of {}: {source}", .path.display())]
    Version {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job {task_id} was cancelled")]
    Cancelled { task_id: TaskId },

    #[error("background job failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("customer first name must not be empty")]
    EmptyFirstName,

    #[error("customer {0} not found")]
    NotFound(i64),

    #[error("customer has no id; save it before updating")]
    MissingId,

    #[error("unsupported database version {found} (expected {expected})")]
    UnsupportedVersion { found: i32, expected: i32 },
}
