use std::sync::Arc;

use nlib_sync::{Schedule, start_scheduler};

use crate::CliError;

use super::Context;

/// Start the cron scheduler and block until Ctrl-C.
pub(crate) fn run_daemon(ctx: &Context) -> Result<(), CliError> {
    let rt = super::runtime()?;
    let schedule = Schedule::from_settings(&ctx.settings);

    rt.block_on(async {
        let orch = Arc::new(ctx.orchestrator()?);
        log::info!(
            "Catalog database: {}",
            ctx.settings.database_path.display()
        );
        log::info!("Media directory: {}", ctx.settings.media_dir.display());

        let running = start_scheduler(orch, &schedule)
            .await
            .map_err(|e| CliError::runtime(format!("Failed to start scheduler: {}", e)))?;

        log::info!("Press Ctrl-C to stop");
        tokio::signal::ctrl_c().await?;

        log::info!("Shutting down scheduler");
        running
            .shutdown()
            .await
            .map_err(|e| CliError::runtime(format!("Scheduler shutdown failed: {}", e)))?;
        Ok(())
    })
}
