//! Write operations for titles, descriptions, and the sync log.
//!
//! Title and description upserts are null-coalescing: on conflict a column
//! only takes the incoming value when the stored one is NULL. Callers own the
//! transaction boundary; every function here works on whatever `Connection`
//! (or `Transaction`, via deref) it is handed.

use nlib_core::{DescriptionFields, SyncStatus, TitleFields};
use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

// ── Title Operations ────────────────────────────────────────────────────────

/// Insert a bare identifier. An existing identifier is left untouched.
///
/// Returns `true` if a new row was created.
pub fn insert_title_id(conn: &Connection, id: &str) -> Result<bool, OperationError> {
    let changed = conn.execute(
        "INSERT INTO titles (id) VALUES (?1) ON CONFLICT(id) DO NOTHING",
        params![id],
    )?;
    Ok(changed > 0)
}

/// Insert many bare identifiers. Returns how many were new.
pub fn insert_title_ids<S: AsRef<str>>(
    conn: &Connection,
    ids: &[S],
) -> Result<usize, OperationError> {
    let mut stmt =
        conn.prepare_cached("INSERT INTO titles (id) VALUES (?1) ON CONFLICT(id) DO NOTHING")?;
    let mut inserted = 0;
    for id in ids {
        inserted += stmt.execute(params![id.as_ref()])?;
    }
    Ok(inserted)
}

/// Whether a title row exists for `id`.
pub fn title_exists(conn: &Connection, id: &str) -> Result<bool, OperationError> {
    let found = conn
        .prepare_cached("SELECT 1 FROM titles WHERE id = ?1")?
        .query_row(params![id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

/// Insert a title or fill in its still-empty fields.
///
/// Populated columns are never overwritten. `version` keeps the highest value
/// seen and `updated_at` is refreshed on every call.
pub fn upsert_title(
    conn: &Connection,
    id: &str,
    fields: &TitleFields,
) -> Result<(), OperationError> {
    conn.prepare_cached(
        "INSERT INTO titles (id, name, publisher, developer, release_date, category,
             languages, nsu_id, number_of_players, rating_content, rights_id, region,
             is_demo, version, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, datetime('now'))
         ON CONFLICT(id) DO UPDATE SET
             name = COALESCE(titles.name, excluded.name),
             publisher = COALESCE(titles.publisher, excluded.publisher),
             developer = COALESCE(titles.developer, excluded.developer),
             release_date = COALESCE(titles.release_date, excluded.release_date),
             category = COALESCE(titles.category, excluded.category),
             languages = COALESCE(titles.languages, excluded.languages),
             nsu_id = COALESCE(titles.nsu_id, excluded.nsu_id),
             number_of_players = COALESCE(titles.number_of_players, excluded.number_of_players),
             rating_content = COALESCE(titles.rating_content, excluded.rating_content),
             rights_id = COALESCE(titles.rights_id, excluded.rights_id),
             region = COALESCE(titles.region, excluded.region),
             is_demo = COALESCE(titles.is_demo, excluded.is_demo),
             version = MAX(titles.version, excluded.version),
             updated_at = datetime('now')",
    )?
    .execute(params![
        id,
        fields.name,
        fields.publisher,
        fields.developer,
        fields.release_date,
        json_list(&fields.category)?,
        json_list(&fields.languages)?,
        fields.nsu_id,
        fields.number_of_players,
        json_list(&fields.rating_content)?,
        fields.rights_id,
        fields.region,
        fields.is_demo,
        fields.version,
    ])?;
    Ok(())
}

// ── Description Operations ──────────────────────────────────────────────────

/// Insert or fill in the `language` description of a title.
///
/// `intro` and `description` are coalesced independently. The title row
/// must already exist.
pub fn upsert_description(
    conn: &Connection,
    title_id: &str,
    language: &str,
    fields: &DescriptionFields,
) -> Result<(), OperationError> {
    conn.prepare_cached(
        "INSERT INTO title_descriptions (title_id, language, intro, description, updated_at)
         VALUES (?1, ?2, ?3, ?4, datetime('now'))
         ON CONFLICT(title_id, language) DO UPDATE SET
             intro = COALESCE(title_descriptions.intro, excluded.intro),
             description = COALESCE(title_descriptions.description, excluded.description),
             updated_at = datetime('now')",
    )?
    .execute(params![title_id, language, fields.intro, fields.description])?;
    Ok(())
}

// ── Sync Log Operations ─────────────────────────────────────────────────────

/// Append a sync log entry. Returns the generated ID.
pub fn insert_sync_log(
    conn: &Connection,
    games_count: i64,
    status: SyncStatus,
    source: &str,
) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO sync_log (games_count, status, source) VALUES (?1, ?2, ?3)",
        params![games_count, status.as_str(), source],
    )?;
    Ok(conn.last_insert_rowid())
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn json_list(list: &Option<Vec<String>>) -> Result<Option<String>, OperationError> {
    Ok(match list {
        Some(items) => Some(serde_json::to_string(items)?),
        None => None,
    })
}
