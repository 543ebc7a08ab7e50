//! The catalog sync pipeline.
//!
//! Seed discovery, per-source catalog download, null-coalescing field merge,
//! media acquisition, the two orchestrated sync jobs, and the cron scheduler
//! that drives them.

pub mod catalog;
pub mod client;
pub mod error;
pub mod media;
pub mod orchestrator;
pub mod progress;
pub mod reconcile;
pub mod scheduler;
pub mod seed;
pub mod store;

pub use catalog::{CatalogPayload, catalog_url, fetch_catalog, parse_catalog};
pub use client::{HttpTransport, Transport};
pub use error::{FetchError, SyncError};
pub use media::{MediaLibrary, MediaOutcome};
pub use orchestrator::{Orchestrator, SyncConfig, SyncResult};
pub use progress::{LogProgress, SilentProgress, SyncProgress};
pub use reconcile::{ReconcileStats, SkipTally, reconcile_source};
pub use scheduler::{RunningScheduler, Schedule, run_startup, start_scheduler};
pub use seed::{SeedStats, discover_identifiers, parse_seed_list};
pub use store::CatalogStore;
