//! Field-merge reconciler.
//!
//! Applies one source's entries to the catalog in fixed-size batches, one
//! transaction per batch. Title and description writes are null-coalescing,
//! so a field filled by an earlier source (or an earlier run) stays as it
//! is. Media for a batch is fetched only after that batch has committed.

use std::collections::BTreeMap;

use nlib_core::{MediaRefs, RejectReason, TitleIdCheck, validate_entry_id};
use nlib_db::{title_exists, upsert_description, upsert_title};

use crate::catalog::CatalogPayload;
use crate::client::Transport;
use crate::error::SyncError;
use crate::media::MediaLibrary;
use crate::progress::SyncProgress;
use crate::store::CatalogStore;

/// Upper bound on retained skip examples.
pub const MAX_SKIP_EXAMPLES: usize = 10;

/// Every this-many skips one example is sampled.
const SKIP_SAMPLE_STRIDE: usize = 1500;

/// Rejected entries: a total, a per-reason breakdown, and a few samples.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SkipTally {
    pub count: usize,
    pub by_reason: BTreeMap<RejectReason, usize>,
    /// `"<id> (<reason>)"`, at most [`MAX_SKIP_EXAMPLES`].
    pub examples: Vec<String>,
}

impl SkipTally {
    pub fn record(&mut self, id: Option<&str>, reason: RejectReason) {
        self.count += 1;
        *self.by_reason.entry(reason).or_default() += 1;
        if let Some(id) = id {
            if self.examples.len() < MAX_SKIP_EXAMPLES && self.count % SKIP_SAMPLE_STRIDE == 1 {
                self.examples.push(format!("{} ({})", id, reason));
            }
        }
    }

    /// Fold another tally in, keeping at most [`MAX_SKIP_EXAMPLES`] samples.
    pub fn absorb(&mut self, other: &SkipTally) {
        self.count += other.count;
        for (reason, n) in &other.by_reason {
            *self.by_reason.entry(*reason).or_default() += n;
        }
        let room = MAX_SKIP_EXAMPLES.saturating_sub(self.examples.len());
        self.examples
            .extend(other.examples.iter().take(room).cloned());
    }
}

/// Per-source statistics.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReconcileStats {
    pub processed: usize,
    pub added: usize,
    pub updated: usize,
    pub skips: SkipTally,
    /// Titles with at least one asset available after the run.
    pub media_titles: usize,
    /// Assets downloaded over the network.
    pub assets_fetched: usize,
}

#[derive(Default)]
struct BatchOutcome {
    processed: usize,
    added: usize,
    updated: usize,
    skips: Vec<(Option<String>, RejectReason)>,
    media: Vec<(String, MediaRefs)>,
}

/// Merge one source into the catalog.
///
/// A storage failure rolls back the current batch and is returned; batches
/// committed before it remain.
pub async fn reconcile_source<T: Transport>(
    store: &CatalogStore,
    transport: &T,
    media: &MediaLibrary,
    payload: &CatalogPayload,
    language: &str,
    batch_size: usize,
    progress: &dyn SyncProgress,
) -> Result<ReconcileStats, SyncError> {
    let mut stats = ReconcileStats::default();
    for _ in 0..payload.malformed {
        stats.skips.record(None, RejectReason::Other);
    }

    let batch_size = batch_size.max(1);
    let total = payload.entries.len();
    let total_batches = total.div_ceil(batch_size);
    log::info!(
        "  Processing {} entries in {} batches...",
        total,
        total_batches
    );

    let mut done = 0;
    for (i, batch) in payload.entries.chunks(batch_size).enumerate() {
        let outcome = store.transaction(|tx| {
            let mut out = BatchOutcome::default();
            for (key, entry) in batch {
                let id = match (validate_entry_id(entry.id.as_deref()), entry.id.as_deref()) {
                    (TitleIdCheck::Valid, Some(id)) => id,
                    (check, _) => {
                        let reason = check.reason().unwrap_or(RejectReason::Other);
                        out.skips.push((entry.id.clone(), reason));
                        continue;
                    }
                };

                if title_exists(tx, id)? {
                    out.updated += 1;
                } else {
                    out.added += 1;
                }
                upsert_title(tx, id, &entry.title_fields(key))?;
                upsert_description(tx, id, language, &entry.description_fields())?;
                out.processed += 1;

                if let Some(refs) = entry.media_refs() {
                    out.media.push((id.to_string(), refs));
                }
            }
            Ok(out)
        })?;

        stats.processed += outcome.processed;
        stats.added += outcome.added;
        stats.updated += outcome.updated;
        for (id, reason) in &outcome.skips {
            stats.skips.record(id.as_deref(), *reason);
        }
        done += batch.len();
        progress.on_batch(i + 1, total_batches, done, total);

        if !outcome.media.is_empty() {
            log::debug!("  Checking media for {} titles...", outcome.media.len());
            let mut with_media = 0;
            for (id, refs) in &outcome.media {
                let result = media.acquire(transport, id, refs).await;
                if result.any() {
                    with_media += 1;
                }
                stats.assets_fetched += result.fetched;
            }
            stats.media_titles += with_media;
            if with_media > 0 {
                log::info!(
                    "  Media available for {} titles from {} source",
                    with_media,
                    language.to_uppercase()
                );
            }
        }
    }

    log::info!(
        "  Processing completed: {} processed, {} new, {} updated, {} skipped",
        stats.processed,
        stats.added,
        stats.updated,
        stats.skips.count
    );
    Ok(stats)
}

#[cfg(test)]
#[path = "tests/reconcile_tests.rs"]
mod tests;
