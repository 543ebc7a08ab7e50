use nlib_core::SyncJob;
use nlib_sync::SyncResult;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;
use crate::cli_types::SyncTarget;

use super::Context;

/// Run one or both sync jobs in the foreground.
pub(crate) fn run_sync(ctx: &Context, target: SyncTarget) -> Result<(), CliError> {
    let rt = super::runtime()?;

    let results = rt.block_on(async {
        let orch = ctx.orchestrator()?;
        let mut results = Vec::new();
        if matches!(target, SyncTarget::Ids | SyncTarget::All) {
            results.push((SyncJob::IdentifierSeed, orch.run_identifier_sync().await));
        }
        if matches!(target, SyncTarget::Catalog | SyncTarget::All) {
            results.push((SyncJob::CatalogMulti, orch.run_catalog_sync().await));
        }
        Ok::<_, CliError>(results)
    })?;

    if ctx.json {
        let mut map = serde_json::Map::new();
        for (job, result) in &results {
            map.insert(job.as_str().to_string(), serde_json::to_value(result)?);
        }
        println!("{}", serde_json::to_string_pretty(&map)?);
    } else {
        for (job, result) in &results {
            print_result(*job, result);
        }
    }

    match results.iter().find(|(_, r)| !r.success) {
        Some((job, _)) => Err(CliError::SyncFailed(*job)),
        None => Ok(()),
    }
}

fn print_result(job: SyncJob, result: &SyncResult) {
    crate::log_blank();
    if !result.success {
        log::info!(
            "{} {}: {}",
            "Failed".if_supports_color(Stdout, |t| t.red()),
            job,
            result.error.as_deref().unwrap_or("unknown error")
        );
        return;
    }

    log::info!(
        "{} {} in {:.2}s",
        "Completed".if_supports_color(Stdout, |t| t.green()),
        job.if_supports_color(Stdout, |t| t.bold()),
        result.duration_ms as f64 / 1000.0
    );
    log::info!("  Processed:  {:>8}", result.processed);
    log::info!("  New:        {:>8}", result.added);
    if job == SyncJob::CatalogMulti {
        log::info!("  Updated:    {:>8}", result.updated);
    }
    log::info!("  Skipped:    {:>8}", result.skipped);

    if job == SyncJob::CatalogMulti {
        log::info!(
            "  Media:      {:>8} titles ({} downloaded)",
            result.media_downloaded,
            result.assets_fetched
        );
        let sources = format!(
            "{} synced, {} unavailable",
            result.sources_synced, result.sources_failed
        );
        if result.sources_failed > 0 {
            log::info!(
                "  Sources:    {}",
                sources.if_supports_color(Stdout, |t| t.yellow())
            );
        } else {
            log::info!("  Sources:    {}", sources);
        }
        for (reason, count) in &result.skip_reasons {
            let label = format!("{:<22}", reason.as_str());
            log::info!(
                "    {}{:>8}",
                label.if_supports_color(Stdout, |t| t.dimmed()),
                count
            );
        }
    }
}
