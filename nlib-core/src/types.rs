//! Canonical record types as stored by the catalog.

use serde::Serialize;

// ── Title ───────────────────────────────────────────────────────────────────

/// One canonical base title.
///
/// Every optional field is filled at most once: after it becomes non-null it
/// is never rewritten by the sync pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleRecord {
    pub id: String,
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub developer: Option<String>,
    pub release_date: Option<String>,
    pub category: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub nsu_id: Option<i64>,
    pub number_of_players: Option<i64>,
    pub rating_content: Option<Vec<String>>,
    pub rights_id: Option<String>,
    pub region: Option<String>,
    pub is_demo: Option<bool>,
    /// Platform tag, always `nx` for titles written by this pipeline.
    pub platform: String,
    /// Title-type tag, always `base` for titles written by this pipeline.
    pub title_type: String,
    pub version: i64,
    pub updated_at: String,
}

/// Per-language text for a title.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedDescription {
    pub title_id: String,
    pub language: String,
    pub intro: Option<String>,
    pub description: Option<String>,
    pub updated_at: String,
}

// ── Sync Log ────────────────────────────────────────────────────────────────

/// Final status of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Success,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Parse a stored status; anything unrecognized reads as `Failed`.
    pub fn from_str_loose(s: &str) -> Self {
        match s {
            "success" => Self::Success,
            _ => Self::Failed,
        }
    }
}

/// The two top-level sync jobs. Also used as the audit log source tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SyncJob {
    #[serde(rename = "identifier-seed")]
    IdentifierSeed,
    #[serde(rename = "catalog-multi")]
    CatalogMulti,
}

impl SyncJob {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdentifierSeed => "identifier-seed",
            Self::CatalogMulti => "catalog-multi",
        }
    }
}

impl std::fmt::Display for SyncJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit record for one sync run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncLogEntry {
    pub id: i64,
    pub synced_at: String,
    pub games_count: i64,
    pub status: SyncStatus,
    pub source: String,
}
