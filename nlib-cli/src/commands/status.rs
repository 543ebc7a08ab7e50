use chrono::{NaiveDateTime, Utc};
use nlib_core::{SyncLogEntry, SyncStatus};
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use crate::CliError;

use super::Context;

/// Catalog counts plus the most recent audit entry.
pub(crate) fn run_status(ctx: &Context) -> Result<(), CliError> {
    let Some(conn) = open_existing(ctx)? else {
        return Ok(());
    };

    let stats = nlib_db::catalog_stats(&conn)
        .map_err(|e| CliError::database(format!("Failed to query catalog stats: {}", e)))?;
    let last = nlib_db::last_sync(&conn)
        .map_err(|e| CliError::database(format!("Failed to query sync log: {}", e)))?;

    if ctx.json {
        let value = serde_json::json!({
            "database": ctx.settings.database_path,
            "titles": stats.titles,
            "namedTitles": stats.named_titles,
            "descriptions": stats.descriptions,
            "languages": stats.languages,
            "syncRuns": stats.sync_runs,
            "lastSync": last,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    log::info!(
        "{}",
        "Catalog Status".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", ctx.settings.database_path.display());
    crate::log_blank();
    log::info!("  Titles:         {:>8}", stats.titles);
    log::info!("  With names:     {:>8}", stats.named_titles);
    log::info!(
        "  Descriptions:   {:>8} ({} languages)",
        stats.descriptions,
        stats.languages
    );
    log::info!("  Sync runs:      {:>8}", stats.sync_runs);
    crate::log_blank();

    match last {
        Some(entry) => log::info!("  Last sync: {}", describe_entry(&entry)),
        None => log::info!("  Last sync: never"),
    }
    Ok(())
}

/// Recent audit entries, newest first.
pub(crate) fn run_log(ctx: &Context, limit: u32) -> Result<(), CliError> {
    let Some(conn) = open_existing(ctx)? else {
        return Ok(());
    };

    let entries = nlib_db::list_sync_logs(&conn, Some(limit))
        .map_err(|e| CliError::database(format!("Failed to query sync log: {}", e)))?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        log::info!("No sync runs recorded yet.");
        return Ok(());
    }
    for entry in &entries {
        log::info!("  #{:<6} {}", entry.id, describe_entry(entry));
    }
    Ok(())
}

fn open_existing(ctx: &Context) -> Result<Option<rusqlite::Connection>, CliError> {
    let db_path = &ctx.settings.database_path;
    if !db_path.exists() {
        log::warn!("No catalog database found at {}", db_path.display());
        log::info!("Run 'nlib sync all' to create one.");
        return Ok(None);
    }
    let conn = nlib_db::open_database(db_path)
        .map_err(|e| CliError::database(format!("Failed to open catalog database: {}", e)))?;
    Ok(Some(conn))
}

fn describe_entry(entry: &SyncLogEntry) -> String {
    let status = match entry.status {
        SyncStatus::Success => entry
            .status
            .as_str()
            .if_supports_color(Stdout, |t| t.green())
            .to_string(),
        SyncStatus::Failed => entry
            .status
            .as_str()
            .if_supports_color(Stdout, |t| t.red())
            .to_string(),
    };
    let age = age_of(&entry.synced_at, Utc::now().naive_utc())
        .map(|age| format!(" ({})", age))
        .unwrap_or_default();
    format!(
        "{} {} {} titles at {}{}",
        entry.source, status, entry.games_count, entry.synced_at, age
    )
}

/// Human-readable age of a `YYYY-MM-DD HH:MM:SS` UTC timestamp.
fn age_of(synced_at: &str, now: NaiveDateTime) -> Option<String> {
    let at = NaiveDateTime::parse_from_str(synced_at, "%Y-%m-%d %H:%M:%S").ok()?;
    let secs = (now - at).num_seconds().max(0);
    Some(match secs {
        0..60 => "just now".to_string(),
        60..3600 => format!("{}m ago", secs / 60),
        3600..86400 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86400),
    })
}
