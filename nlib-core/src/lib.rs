//! Core types shared by every nlib crate.
//!
//! Holds the title identifier classifier, the catalog entry shape read from
//! remote sources, the canonical record types, the source list, and the
//! settings file loader. Nothing in here touches the network or the database.

pub mod entry;
pub mod settings;
pub mod source;
pub mod title_id;
pub mod types;

pub use entry::{CatalogEntry, DescriptionFields, MediaRefs, TitleFields, normalize_release_date};
pub use settings::{Settings, SettingsError, settings_path};
pub use source::{CatalogSource, default_sources, sort_by_priority};
pub use title_id::{RejectReason, TitleIdCheck, validate_entry_id, validate_title_id};
pub use types::{LocalizedDescription, SyncJob, SyncLogEntry, SyncStatus, TitleRecord};
