//! Application settings (store location, source URLs, schedules).
//!
//! The CLI and the scheduler daemon both read
//! `~/.config/nlib/settings.toml`. Every key is optional; a missing file
//! means all defaults.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::{CatalogSource, default_sources, sort_by_priority};

pub const DEFAULT_SEED_URL: &str = "https://nx-missing.ghostland.at/data/working.txt";
pub const DEFAULT_CATALOG_BASE_URL: &str =
    "https://raw.githubusercontent.com/blawar/titledb/refs/heads/master";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Canonical path to the settings file: `~/.config/nlib/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("nlib").join("settings.toml")
}

/// Default directory for the database and media: `~/.local/share/nlib`.
pub fn default_data_dir() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("nlib")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub database_path: PathBuf,
    pub media_dir: PathBuf,
    pub seed_url: String,
    pub catalog_base_url: String,
    pub catalog_timeout_secs: u64,
    pub media_timeout_secs: u64,
    pub batch_size: usize,
    /// Cron expression with a seconds field, evaluated in UTC.
    pub identifier_schedule: String,
    pub catalog_schedule: String,
    pub run_on_start: bool,
    pub sources: Vec<CatalogSource>,
}

impl Default for Settings {
    fn default() -> Self {
        let data = default_data_dir();
        Self {
            database_path: data.join("nlib.db"),
            media_dir: data.join("media"),
            seed_url: DEFAULT_SEED_URL.to_string(),
            catalog_base_url: DEFAULT_CATALOG_BASE_URL.to_string(),
            catalog_timeout_secs: 180,
            media_timeout_secs: 30,
            batch_size: 1000,
            identifier_schedule: "0 0 3 * * *".to_string(),
            catalog_schedule: "0 0 3,15 * * *".to_string(),
            run_on_start: true,
            sources: default_sources(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, falling back to defaults if the file is absent.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the settings to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let serialized = self.to_toml_string()?;
        // Write atomically
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, serialized).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.batch_size == 0 {
            return Err(SettingsError::Invalid("batch_size must be at least 1".into()));
        }
        if let Some(s) = self
            .sources
            .iter()
            .find(|s| s.region.is_empty() || s.language.is_empty())
        {
            return Err(SettingsError::Invalid(format!(
                "source with priority {} needs both region and language",
                s.priority
            )));
        }
        Ok(())
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_secs)
    }

    pub fn media_timeout(&self) -> Duration {
        Duration::from_secs(self.media_timeout_secs)
    }

    /// Configured sources in the order they are merged.
    pub fn sorted_sources(&self) -> Vec<CatalogSource> {
        let mut sources = self.sources.clone();
        sort_by_priority(&mut sources);
        sources
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
