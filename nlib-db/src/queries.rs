//! Read-only queries over the catalog.

use nlib_core::{LocalizedDescription, SyncLogEntry, SyncStatus, TitleRecord};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::operations::OperationError;

const TITLE_COLUMNS: &str = "id, name, publisher, developer, release_date, category, languages,
     nsu_id, number_of_players, rating_content, rights_id, region, is_demo,
     platform, title_type, version, updated_at";

/// Fetch one title by identifier.
pub fn get_title(conn: &Connection, id: &str) -> Result<Option<TitleRecord>, OperationError> {
    let sql = format!("SELECT {TITLE_COLUMNS} FROM titles WHERE id = ?1");
    let title = conn
        .query_row(&sql, params![id], row_to_title)
        .optional()?;
    Ok(title)
}

fn row_to_title(row: &Row<'_>) -> rusqlite::Result<TitleRecord> {
    Ok(TitleRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        publisher: row.get(2)?,
        developer: row.get(3)?,
        release_date: row.get(4)?,
        category: json_list_column(row, 5)?,
        languages: json_list_column(row, 6)?,
        nsu_id: row.get(7)?,
        number_of_players: row.get(8)?,
        rating_content: json_list_column(row, 9)?,
        rights_id: row.get(10)?,
        region: row.get(11)?,
        is_demo: row.get(12)?,
        platform: row.get(13)?,
        title_type: row.get(14)?,
        version: row.get(15)?,
        updated_at: row.get(16)?,
    })
}

/// Fetch the description of a title in one language.
pub fn get_description(
    conn: &Connection,
    title_id: &str,
    language: &str,
) -> Result<Option<LocalizedDescription>, OperationError> {
    let desc = conn
        .query_row(
            "SELECT title_id, language, intro, description, updated_at
             FROM title_descriptions WHERE title_id = ?1 AND language = ?2",
            params![title_id, language],
            row_to_description,
        )
        .optional()?;
    Ok(desc)
}

/// All descriptions of a title, ordered by language.
pub fn descriptions_for_title(
    conn: &Connection,
    title_id: &str,
) -> Result<Vec<LocalizedDescription>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT title_id, language, intro, description, updated_at
         FROM title_descriptions WHERE title_id = ?1 ORDER BY language",
    )?;
    let rows = stmt.query_map(params![title_id], row_to_description)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

fn row_to_description(row: &Row<'_>) -> rusqlite::Result<LocalizedDescription> {
    Ok(LocalizedDescription {
        title_id: row.get(0)?,
        language: row.get(1)?,
        intro: row.get(2)?,
        description: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Number of title rows.
pub fn title_count(conn: &Connection) -> Result<i64, OperationError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM titles", [], |r| r.get(0))?)
}

/// Summary counts for the catalog.
pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let titles: i64 = conn.query_row("SELECT COUNT(*) FROM titles", [], |r| r.get(0))?;
    let named_titles: i64 = conn.query_row(
        "SELECT COUNT(*) FROM titles WHERE name IS NOT NULL",
        [],
        |r| r.get(0),
    )?;
    let descriptions: i64 =
        conn.query_row("SELECT COUNT(*) FROM title_descriptions", [], |r| r.get(0))?;
    let languages: i64 = conn.query_row(
        "SELECT COUNT(DISTINCT language) FROM title_descriptions",
        [],
        |r| r.get(0),
    )?;
    let sync_runs: i64 = conn.query_row("SELECT COUNT(*) FROM sync_log", [], |r| r.get(0))?;

    Ok(CatalogStats {
        titles,
        named_titles,
        descriptions,
        languages,
        sync_runs,
    })
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CatalogStats {
    pub titles: i64,
    pub named_titles: i64,
    pub descriptions: i64,
    pub languages: i64,
    pub sync_runs: i64,
}

/// Most recent sync log entry, if any.
pub fn last_sync(conn: &Connection) -> Result<Option<SyncLogEntry>, OperationError> {
    Ok(list_sync_logs(conn, Some(1))?.into_iter().next())
}

/// Sync log entries, newest first.
pub fn list_sync_logs(
    conn: &Connection,
    limit: Option<u32>,
) -> Result<Vec<SyncLogEntry>, OperationError> {
    let limit = limit.map(i64::from).unwrap_or(-1);
    let mut stmt = conn.prepare(
        "SELECT id, synced_at, games_count, status, source
         FROM sync_log ORDER BY id DESC LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], |row| {
        let status: String = row.get(3)?;
        Ok(SyncLogEntry {
            id: row.get(0)?,
            synced_at: row.get(1)?,
            games_count: row.get(2)?,
            status: SyncStatus::from_str_loose(&status),
            source: row.get(4)?,
        })
    })?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Decode a JSON array column written by `upsert_title`.
fn json_list_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Vec<String>>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|text| {
        serde_json::from_str(&text).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    })
    .transpose()
}
