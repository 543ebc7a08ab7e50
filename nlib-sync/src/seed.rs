//! Seed discovery: bare base-title identifiers from a flat text list.
//!
//! Each line of the seed resource is `identifier|auxiliary`. Only the
//! identifier is used. Lines that do not hold a base-title identifier are
//! dropped and counted, never logged one by one.

use std::time::Instant;

use nlib_core::validate_title_id;

use crate::client::Transport;
use crate::error::SyncError;
use crate::progress::SyncProgress;
use crate::store::CatalogStore;

/// Identifiers read from one seed document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SeedList {
    /// Valid identifiers in document order. Duplicates are kept.
    pub ids: Vec<String>,
    /// Non-blank lines whose identifier was rejected.
    pub discarded: usize,
}

/// Outcome of one discovery run.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SeedStats {
    pub total_seen: usize,
    pub total_inserted: usize,
    pub discarded: usize,
    pub duration_ms: u64,
}

/// Split a seed document into valid identifiers.
pub fn parse_seed_list(text: &str) -> SeedList {
    let mut list = SeedList::default();
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let id = line.split('|').next().unwrap_or_default().trim();
        if validate_title_id(id).is_valid() {
            list.ids.push(id.to_string());
        } else {
            list.discarded += 1;
        }
    }
    list
}

/// Insert identifiers in batches of `batch_size`, one transaction per batch.
///
/// Existing identifiers are left alone. A failing batch is rolled back and
/// aborts the remaining batches; earlier batches stay committed.
pub fn seed_store(
    store: &CatalogStore,
    ids: &[String],
    batch_size: usize,
    progress: &dyn SyncProgress,
) -> Result<usize, SyncError> {
    let batch_size = batch_size.max(1);
    let total_batches = ids.len().div_ceil(batch_size);
    let mut inserted = 0;
    let mut done = 0;

    for (i, batch) in ids.chunks(batch_size).enumerate() {
        let count = store.transaction(|tx| Ok(nlib_db::insert_title_ids(tx, batch)?))?;
        inserted += count;
        done += batch.len();
        progress.on_batch(i + 1, total_batches, done, ids.len());
        log::debug!("Seed batch {}: {} new identifiers", i + 1, count);
    }

    Ok(inserted)
}

/// Fetch the seed list from `url` and store every valid identifier.
///
/// The request carries no timeout beyond the transport default. A fetch
/// failure aborts the run, as does any storage failure.
pub async fn discover_identifiers<T: Transport>(
    transport: &T,
    store: &CatalogStore,
    url: &str,
    batch_size: usize,
    progress: &dyn SyncProgress,
) -> Result<SeedStats, SyncError> {
    let start = Instant::now();
    log::info!("Downloading identifier list from {}", url);

    let text = transport
        .get_text(url, None)
        .await
        .map_err(SyncError::Seed)?;
    let list = parse_seed_list(&text);
    log::info!(
        "Found {} valid identifiers ({} lines discarded)",
        list.ids.len(),
        list.discarded
    );

    let total_inserted = seed_store(store, &list.ids, batch_size, progress)?;

    Ok(SeedStats {
        total_seen: list.ids.len(),
        total_inserted,
        discarded: list.discarded,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
#[path = "tests/seed_tests.rs"]
mod tests;
