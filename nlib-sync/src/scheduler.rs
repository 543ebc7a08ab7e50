//! Cron-driven sync scheduler.
//!
//! Both jobs fire on their own calendar trigger. Runs are fire-and-forget:
//! a trigger never waits for another job, and an overlapping trigger of the
//! same job is dropped by the orchestrator's run lock.

use std::sync::Arc;

use nlib_core::{Settings, SyncJob};
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::client::Transport;
use crate::error::SyncError;
use crate::orchestrator::{Orchestrator, SyncResult};

/// Cron expressions (with seconds field, UTC) for the two jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub identifier: String,
    pub catalog: String,
    pub run_on_start: bool,
}

impl Schedule {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            identifier: settings.identifier_schedule.clone(),
            catalog: settings.catalog_schedule.clone(),
            run_on_start: settings.run_on_start,
        }
    }
}

/// A started scheduler plus the optional startup run.
pub struct RunningScheduler {
    scheduler: JobScheduler,
    startup: Option<JoinHandle<()>>,
}

impl RunningScheduler {
    /// Handle of the startup run, if one was launched.
    pub fn startup(&mut self) -> Option<&mut JoinHandle<()>> {
        self.startup.as_mut()
    }

    /// Stop firing triggers. Runs already in flight are not interrupted.
    pub async fn shutdown(mut self) -> Result<(), SyncError> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}

/// Register both jobs, start the scheduler, and launch the startup run.
pub async fn start_scheduler<T>(
    orchestrator: Arc<Orchestrator<T>>,
    schedule: &Schedule,
) -> Result<RunningScheduler, SyncError>
where
    T: Transport + 'static,
{
    let scheduler = JobScheduler::new().await?;

    for (job, cron) in [
        (SyncJob::IdentifierSeed, schedule.identifier.as_str()),
        (SyncJob::CatalogMulti, schedule.catalog.as_str()),
    ] {
        let orch = Arc::clone(&orchestrator);
        let cron_job = Job::new_async(cron, move |_uuid, _l| {
            let orch = Arc::clone(&orch);
            Box::pin(async move {
                log::info!("Starting scheduled {} synchronization", job);
                let result = run_job(&orch, job).await;
                report(job, &result);
            })
        })?;
        scheduler.add(cron_job).await?;
        log::info!("Scheduled {} sync: {}", job, cron);
    }

    scheduler.start().await?;
    log::info!("Scheduler started");

    let startup = schedule.run_on_start.then(|| {
        let orch = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            log::info!("Running initial synchronization");
            run_startup(&orch).await;
        })
    });

    Ok(RunningScheduler { scheduler, startup })
}

/// Identifier sync to completion, then catalog sync.
pub async fn run_startup<T: Transport>(orchestrator: &Orchestrator<T>) -> (SyncResult, SyncResult) {
    let ids = orchestrator.run_identifier_sync().await;
    report(SyncJob::IdentifierSeed, &ids);
    let catalog = orchestrator.run_catalog_sync().await;
    report(SyncJob::CatalogMulti, &catalog);
    (ids, catalog)
}

async fn run_job<T: Transport>(orchestrator: &Orchestrator<T>, job: SyncJob) -> SyncResult {
    match job {
        SyncJob::IdentifierSeed => orchestrator.run_identifier_sync().await,
        SyncJob::CatalogMulti => orchestrator.run_catalog_sync().await,
    }
}

fn report(job: SyncJob, result: &SyncResult) {
    if result.success {
        log::info!(
            "{} sync finished in {}ms ({} processed)",
            job,
            result.duration_ms,
            result.processed
        );
    } else {
        log::warn!(
            "{} sync did not complete: {}",
            job,
            result.error.as_deref().unwrap_or("unknown error")
        );
    }
}
