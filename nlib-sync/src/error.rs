use nlib_core::SyncJob;
use nlib_db::{OperationError, SchemaError};

/// Errors from a single remote request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that abort a sync run.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Seed source unavailable: {0}")]
    Seed(#[source] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] OperationError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Database error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Catalog store lock poisoned")]
    Poisoned,

    #[error("{0} sync already running")]
    AlreadyRunning(SyncJob),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}
