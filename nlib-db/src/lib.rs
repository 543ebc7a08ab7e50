//! SQLite persistence layer for the title catalog.
//!
//! Provides schema creation, the null-coalescing upserts used by the sync
//! pipeline, the append-only sync log, and read queries, backed by SQLite
//! (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;

pub use operations::{
    OperationError, insert_sync_log, insert_title_id, insert_title_ids, title_exists,
    upsert_description, upsert_title,
};
pub use queries::{
    CatalogStats, catalog_stats, descriptions_for_title, get_description, get_title, last_sync,
    list_sync_logs, title_count,
};
pub use schema::{SchemaError, open_database, open_memory};
