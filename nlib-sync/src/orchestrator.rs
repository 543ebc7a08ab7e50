//! Sync orchestrator: the two top-level entry points.
//!
//! Identifier sync seeds bare identifiers. Catalog sync walks the configured
//! sources in priority order, merging each one that downloads successfully.
//! Every run that actually starts leaves exactly one audit entry.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use nlib_core::{CatalogSource, RejectReason, Settings, SyncJob, SyncStatus};
use serde::Serialize;

use crate::catalog::fetch_catalog;
use crate::client::Transport;
use crate::error::SyncError;
use crate::media::MediaLibrary;
use crate::progress::{LogProgress, SyncProgress};
use crate::reconcile::{ReconcileStats, SkipTally, reconcile_source};
use crate::seed::discover_identifiers;
use crate::store::CatalogStore;

/// Structured outcome of one sync run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    pub processed: usize,
    pub added: usize,
    pub updated: usize,
    pub skipped: usize,
    /// Titles with at least one media asset available.
    pub media_downloaded: usize,
    /// Media assets downloaded over the network.
    pub assets_fetched: usize,
    pub skip_examples: Vec<String>,
    pub skip_reasons: BTreeMap<RejectReason, usize>,
    pub sources_synced: usize,
    pub sources_failed: usize,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SyncResult {
    pub fn failure(error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            success: false,
            duration_ms,
            error: Some(error.into()),
            ..Default::default()
        }
    }

    fn absorb(&mut self, stats: &ReconcileStats, skips: &mut SkipTally) {
        self.processed += stats.processed;
        self.added += stats.added;
        self.updated += stats.updated;
        self.media_downloaded += stats.media_titles;
        self.assets_fetched += stats.assets_fetched;
        self.sources_synced += 1;
        skips.absorb(&stats.skips);
    }
}

/// Pipeline parameters, usually taken from [`Settings`].
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub seed_url: String,
    pub catalog_base_url: String,
    pub catalog_timeout: Duration,
    pub batch_size: usize,
    /// Sources in merge order.
    pub sources: Vec<CatalogSource>,
}

impl SyncConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            seed_url: settings.seed_url.clone(),
            catalog_base_url: settings.catalog_base_url.clone(),
            catalog_timeout: settings.catalog_timeout(),
            batch_size: settings.batch_size,
            sources: settings.sorted_sources(),
        }
    }
}

/// Clears a job's running flag when dropped.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives seed discovery and the multi-source catalog merge.
///
/// A job triggered while the same job is still running is skipped and
/// reported as a failed [`SyncResult`] without an audit entry.
pub struct Orchestrator<T> {
    store: CatalogStore,
    transport: T,
    media: MediaLibrary,
    config: SyncConfig,
    progress: Arc<dyn SyncProgress>,
    identifier_running: AtomicBool,
    catalog_running: AtomicBool,
}

impl<T: Transport> Orchestrator<T> {
    pub fn new(store: CatalogStore, transport: T, media: MediaLibrary, config: SyncConfig) -> Self {
        Self {
            store,
            transport,
            media,
            config,
            progress: Arc::new(LogProgress),
            identifier_running: AtomicBool::new(false),
            catalog_running: AtomicBool::new(false),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn SyncProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Whether `job` is currently running.
    pub fn is_running(&self, job: SyncJob) -> bool {
        self.flag(job).load(Ordering::Acquire)
    }

    fn flag(&self, job: SyncJob) -> &AtomicBool {
        match job {
            SyncJob::IdentifierSeed => &self.identifier_running,
            SyncJob::CatalogMulti => &self.catalog_running,
        }
    }

    /// Seed the catalog with every base identifier from the seed source.
    pub async fn run_identifier_sync(&self) -> SyncResult {
        let job = SyncJob::IdentifierSeed;
        let Some(_guard) = RunGuard::acquire(self.flag(job)) else {
            return self.already_running(job);
        };

        let start = Instant::now();
        self.progress
            .on_phase("=== Starting identifier synchronization ===");

        let outcome = discover_identifiers(
            &self.transport,
            &self.store,
            &self.config.seed_url,
            self.config.batch_size,
            self.progress.as_ref(),
        )
        .await;

        let duration_ms = elapsed_ms(start);
        match outcome {
            Ok(stats) => {
                self.audit(job, stats.total_seen, SyncStatus::Success);
                self.progress.on_complete(&format!(
                    "Identifier sync completed in {}ms: {} seen, {} new, {} discarded",
                    duration_ms, stats.total_seen, stats.total_inserted, stats.discarded
                ));
                SyncResult {
                    success: true,
                    processed: stats.total_seen,
                    added: stats.total_inserted,
                    skipped: stats.discarded,
                    duration_ms,
                    ..Default::default()
                }
            }
            Err(e) => self.fail(job, e, duration_ms),
        }
    }

    /// Merge every configured source, in priority order.
    ///
    /// A source that cannot be downloaded is skipped. A storage failure
    /// aborts the whole run.
    pub async fn run_catalog_sync(&self) -> SyncResult {
        let job = SyncJob::CatalogMulti;
        let Some(_guard) = RunGuard::acquire(self.flag(job)) else {
            return self.already_running(job);
        };

        let start = Instant::now();
        self.progress.on_phase(&format!(
            "=== Starting catalog synchronization ({} sources) ===",
            self.config.sources.len()
        ));

        let mut result = SyncResult::default();
        let mut skips = SkipTally::default();
        let outcome = self.merge_sources(&mut result, &mut skips).await;
        let duration_ms = elapsed_ms(start);

        if let Err(e) = outcome {
            return self.fail(job, e, duration_ms);
        }

        result.success = true;
        result.skipped = skips.count;
        result.skip_reasons = skips.by_reason;
        result.skip_examples = skips.examples;
        result.duration_ms = duration_ms;

        self.audit(job, result.processed, SyncStatus::Success);
        log_catalog_summary(&result);
        self.progress.on_complete(&format!(
            "Catalog sync completed in {:.2}s",
            duration_ms as f64 / 1000.0
        ));
        result
    }

    async fn merge_sources(
        &self,
        result: &mut SyncResult,
        skips: &mut SkipTally,
    ) -> Result<(), SyncError> {
        let total = self.config.sources.len();
        for (idx, source) in self.config.sources.iter().enumerate() {
            self.progress
                .on_phase(&format!("[{}/{}] Syncing {}", idx + 1, total, source.tag()));

            let Some(payload) = fetch_catalog(
                &self.transport,
                &self.config.catalog_base_url,
                source,
                self.config.catalog_timeout,
            )
            .await
            else {
                log::warn!("  Skipping {} (download failed)", source.tag());
                result.sources_failed += 1;
                continue;
            };

            let stats = reconcile_source(
                &self.store,
                &self.transport,
                &self.media,
                &payload,
                &source.language,
                self.config.batch_size,
                self.progress.as_ref(),
            )
            .await?;

            log::info!(
                "  Completed {}: {} titles ({} new, {} updated)",
                source.tag(),
                stats.processed,
                stats.added,
                stats.updated
            );
            result.absorb(&stats, skips);
        }
        Ok(())
    }

    fn already_running(&self, job: SyncJob) -> SyncResult {
        let err = SyncError::AlreadyRunning(job);
        log::warn!("Skipping trigger: {}", err);
        SyncResult::failure(err.to_string(), 0)
    }

    fn fail(&self, job: SyncJob, err: SyncError, duration_ms: u64) -> SyncResult {
        log::error!("{} synchronization failed: {}", job, err);
        self.audit(job, 0, SyncStatus::Failed);
        SyncResult::failure(err.to_string(), duration_ms)
    }

    /// Append the run's audit entry. A failure here is logged, not returned.
    fn audit(&self, job: SyncJob, count: usize, status: SyncStatus) {
        let written = self.store.with_conn(|conn| {
            Ok(nlib_db::insert_sync_log(
                conn,
                count as i64,
                status,
                job.as_str(),
            )?)
        });
        if let Err(e) = written {
            log::error!("Failed to record {} sync log entry: {}", job, e);
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

fn log_catalog_summary(result: &SyncResult) {
    log::info!("=== Catalog Synchronization Summary ===");
    log::info!("Total processed: {} titles", result.processed);
    log::info!("  - New: {}", result.added);
    log::info!("  - Updated: {}", result.updated);
    log::info!("  - Skipped: {}", result.skipped);
    log::info!(
        "  - Media: {} titles ({} assets downloaded)",
        result.media_downloaded,
        result.assets_fetched
    );
    log::info!(
        "  - Sources: {} synced, {} unavailable",
        result.sources_synced,
        result.sources_failed
    );
    if !result.skip_reasons.is_empty() {
        log::info!("Skipped by reason:");
        for (reason, count) in &result.skip_reasons {
            log::info!("  - {}: {}", reason, count);
        }
    }
    if !result.skip_examples.is_empty() {
        log::info!("Skipped examples:");
        for example in &result.skip_examples {
            log::info!("  - {}", example);
        }
    }
}
