use nlib_core::{DescriptionFields, SyncStatus, TitleFields};
use nlib_db::*;

fn setup_db() -> rusqlite::Connection {
    let conn = open_memory().unwrap();
    insert_title_ids(&conn, &["0100000000010000", "01007EF00011E000", "0100A0D004FB0000"])
        .unwrap();
    upsert_title(
        &conn,
        "01007EF00011E000",
        &TitleFields {
            name: Some("Zelda".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    for lang in ["en", "ja"] {
        upsert_description(
            &conn,
            "01007EF00011E000",
            lang,
            &DescriptionFields {
                intro: Some(format!("{lang} intro")),
                description: None,
            },
        )
        .unwrap();
    }
    upsert_description(
        &conn,
        "0100000000010000",
        "en",
        &DescriptionFields::default(),
    )
    .unwrap();
    conn
}

#[test]
fn get_missing_title_is_none() {
    let conn = setup_db();
    assert!(get_title(&conn, "0100FFFFFFFFF000").unwrap().is_none());
    assert!(get_description(&conn, "01007EF00011E000", "de").unwrap().is_none());
}

#[test]
fn stats_count_titles_and_descriptions() {
    let conn = setup_db();
    insert_sync_log(&conn, 3, SyncStatus::Success, "identifier-seed").unwrap();

    let stats = catalog_stats(&conn).unwrap();
    assert_eq!(
        stats,
        CatalogStats {
            titles: 3,
            named_titles: 1,
            descriptions: 3,
            languages: 2,
            sync_runs: 1,
        }
    );
}

#[test]
fn last_sync_is_newest_entry() {
    let conn = setup_db();
    assert!(last_sync(&conn).unwrap().is_none());

    insert_sync_log(&conn, 3, SyncStatus::Success, "identifier-seed").unwrap();
    insert_sync_log(&conn, 2, SyncStatus::Success, "catalog-multi").unwrap();

    let last = last_sync(&conn).unwrap().unwrap();
    assert_eq!(last.source, "catalog-multi");
    assert_eq!(last.games_count, 2);
}

#[test]
fn list_sync_logs_respects_limit() {
    let conn = setup_db();
    for n in 0..5 {
        insert_sync_log(&conn, n, SyncStatus::Success, "catalog-multi").unwrap();
    }
    let logs = list_sync_logs(&conn, Some(3)).unwrap();
    let counts: Vec<_> = logs.iter().map(|l| l.games_count).collect();
    assert_eq!(counts, vec![4, 3, 2]);
}
