use nlib_core::{SettingsError, SyncJob};
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be read or is invalid
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Runtime creation or async error
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// JSON output could not be produced
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A sync run reported failure
    #[error("{0} sync failed")]
    SyncFailed(SyncJob),
}

impl CliError {
    pub(crate) fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }
}
