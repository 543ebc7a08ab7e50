pub(crate) mod config;
pub(crate) mod daemon;
pub(crate) mod status;
pub(crate) mod sync;

use std::path::PathBuf;

use nlib_core::{Settings, settings_path};
use nlib_sync::{CatalogStore, HttpTransport, MediaLibrary, Orchestrator, SyncConfig};

use crate::CliError;
use crate::cli_types::Cli;

/// Effective settings for one invocation.
pub(crate) struct Context {
    pub settings: Settings,
    pub settings_path: PathBuf,
    pub json: bool,
}

impl Context {
    /// Load the settings file and apply command-line overrides.
    pub(crate) fn load(cli: &Cli) -> Result<Self, CliError> {
        let settings_path = cli.config.clone().unwrap_or_else(settings_path);
        let mut settings = Settings::load(&settings_path)?;
        if let Some(db) = &cli.db {
            settings.database_path = db.clone();
        }
        if let Some(media_dir) = &cli.media_dir {
            settings.media_dir = media_dir.clone();
        }
        Ok(Self {
            settings,
            settings_path,
            json: cli.json,
        })
    }

    pub(crate) fn orchestrator(&self) -> Result<Orchestrator<HttpTransport>, CliError> {
        let store = CatalogStore::open(&self.settings.database_path).map_err(|e| {
            CliError::database(format!(
                "Failed to open {}: {}",
                self.settings.database_path.display(),
                e
            ))
        })?;
        let transport = HttpTransport::new()
            .map_err(|e| CliError::runtime(format!("Failed to create HTTP client: {}", e)))?;
        let media = MediaLibrary::new(&self.settings.media_dir, self.settings.media_timeout());

        Ok(Orchestrator::new(
            store,
            transport,
            media,
            SyncConfig::from_settings(&self.settings),
        ))
    }
}

pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::runtime(format!("Failed to create tokio runtime: {}", e)))
}
