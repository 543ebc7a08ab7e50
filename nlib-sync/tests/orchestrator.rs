mod common;

use std::sync::Arc;

use common::{FakeTransport, GatedTransport, SEED_URL, audit_entries, config, orchestrator};
use nlib_core::{CatalogSource, Settings, SyncStatus, TitleRecord};
use nlib_sync::{CatalogStore, SyncConfig, run_startup};
use serde_json::json;

fn us() -> CatalogSource {
    CatalogSource::new("US", "en", 1)
}

fn gb() -> CatalogSource {
    CatalogSource::new("GB", "en", 2)
}

fn jp() -> CatalogSource {
    CatalogSource::new("JP", "ja", 3)
}

fn titles(store: &CatalogStore, ids: &[&str]) -> Vec<TitleRecord> {
    ids.iter()
        .map(|id| {
            let mut t = store
                .with_conn(|c| Ok(nlib_db::get_title(c, id)?))
                .unwrap()
                .unwrap();
            t.updated_at.clear();
            t
        })
        .collect()
}

#[tokio::test]
async fn identifier_sync_seeds_and_audits() {
    let store = CatalogStore::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new().text(
        SEED_URL,
        "0100000000010000|1\n01007EF00011E000|2\n01007EF00011E800|3\n0100000000010000|4\n",
    );
    let orch = orchestrator(&store, fake, dir.path(), config(vec![], 2));

    let result = orch.run_identifier_sync().await;

    assert!(result.success);
    assert_eq!(result.processed, 3);
    assert_eq!(result.added, 2);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.error, None);

    let audit = audit_entries(&store);
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].source, "identifier-seed");
    assert_eq!(audit[0].status, SyncStatus::Success);
    assert_eq!(audit[0].games_count, 3);
}

#[tokio::test]
async fn identifier_sync_failure_records_failed_entry() {
    let store = CatalogStore::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new().status(SEED_URL, 503);
    let orch = orchestrator(&store, fake, dir.path(), config(vec![], 1000));

    let result = orch.run_identifier_sync().await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("503"));

    let audit = audit_entries(&store);
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].status, SyncStatus::Failed);
    assert_eq!(audit[0].games_count, 0);
}

#[tokio::test]
async fn failing_source_is_skipped_and_totals_exclude_it() {
    let store = CatalogStore::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new()
        .catalog(
            &us(),
            &json!({
                "1": { "id": "0100000000010000", "name": "Mario" },
                "2": { "id": "01007EF00011E000", "name": "Zelda" },
                "3": { "id": "01007EF00011E001" }
            }),
        )
        .status(&nlib_sync::catalog_url(common::CATALOG_BASE, &gb()), 500)
        .catalog(
            &jp(),
            &json!({
                "4": { "id": "01007EF00011E000", "name": "ゼルダ" },
                "5": { "id": "0100A0D004FB0000", "name": "Kirby" }
            }),
        );
    let orch = orchestrator(&store, fake, dir.path(), config(vec![us(), gb(), jp()], 1000));

    let result = orch.run_catalog_sync().await;

    assert!(result.success);
    assert_eq!(result.sources_synced, 2);
    assert_eq!(result.sources_failed, 1);
    assert_eq!(result.processed, 4);
    assert_eq!(result.added, 3);
    assert_eq!(result.updated, 1);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.skip_examples, vec!["01007EF00011E001 (is-dlc)"]);

    let audit = audit_entries(&store);
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].source, "catalog-multi");
    assert_eq!(audit[0].status, SyncStatus::Success);
    assert_eq!(audit[0].games_count, 4);

    let zelda = &titles(&store, &["01007EF00011E000"])[0];
    assert_eq!(zelda.name.as_deref(), Some("Zelda"));
}

#[tokio::test]
async fn higher_priority_source_wins_regardless_of_config_order() {
    let us_body = json!({ "1": { "id": "01007EF00011E000", "name": "US name" } });
    let jp_body = json!({ "1": { "id": "01007EF00011E000", "name": "JP name" } });

    for (us_priority, jp_priority, expected) in [(1, 2, "US name"), (2, 1, "JP name")] {
        let store = CatalogStore::open_memory().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let us_source = CatalogSource::new("US", "en", us_priority);
        let jp_source = CatalogSource::new("JP", "ja", jp_priority);

        let settings = Settings {
            sources: vec![jp_source.clone(), us_source.clone()],
            ..Settings::default()
        };
        let sync_config = SyncConfig {
            seed_url: SEED_URL.to_string(),
            catalog_base_url: common::CATALOG_BASE.to_string(),
            ..SyncConfig::from_settings(&settings)
        };
        let fake = FakeTransport::new()
            .catalog(&us_source, &us_body)
            .catalog(&jp_source, &jp_body);
        let orch = orchestrator(&store, fake, dir.path(), sync_config);

        assert!(orch.run_catalog_sync().await.success);
        let title = &titles(&store, &["01007EF00011E000"])[0];
        assert_eq!(title.name.as_deref(), Some(expected));
    }
}

#[tokio::test]
async fn catalog_sync_is_idempotent() {
    let store = CatalogStore::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new()
        .catalog(
            &us(),
            &json!({
                "70010000000025": {
                    "id": "01007EF00011E000",
                    "name": "Zelda",
                    "publisher": "Nintendo",
                    "releaseDate": 20170303,
                    "category": ["Adventure"],
                    "languages": ["en", "ja"],
                    "intro": "Step into a world",
                    "version": 65536
                }
            }),
        )
        .catalog(
            &jp(),
            &json!({
                "70010000000025": {
                    "id": "01007EF00011E000",
                    "developer": "Nintendo EPD",
                    "description": "広大な世界"
                }
            }),
        );
    let orch = orchestrator(&store, fake, dir.path(), config(vec![us(), jp()], 1000));

    assert!(orch.run_catalog_sync().await.success);
    let first = titles(&store, &["01007EF00011E000"]);
    let first_desc = store
        .with_conn(|c| Ok(nlib_db::descriptions_for_title(c, "01007EF00011E000")?))
        .unwrap();

    let again = orch.run_catalog_sync().await;
    assert!(again.success);
    assert_eq!(again.added, 0);
    assert_eq!(again.updated, 2);

    assert_eq!(titles(&store, &["01007EF00011E000"]), first);
    let second_desc = store
        .with_conn(|c| Ok(nlib_db::descriptions_for_title(c, "01007EF00011E000")?))
        .unwrap();
    let strip = |d: &nlib_core::LocalizedDescription| {
        (d.language.clone(), d.intro.clone(), d.description.clone())
    };
    assert_eq!(
        second_desc.iter().map(strip).collect::<Vec<_>>(),
        first_desc.iter().map(strip).collect::<Vec<_>>()
    );
    assert_eq!(first[0].developer.as_deref(), Some("Nintendo EPD"));
    assert_eq!(first[0].version, 65536);
}

#[tokio::test]
async fn storage_failure_aborts_run_with_failed_audit() {
    let store = CatalogStore::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    store
        .with_conn(|c| {
            c.execute_batch(
                "CREATE TRIGGER reject_zelda BEFORE INSERT ON titles
                 WHEN NEW.id = '01007EF00011E000'
                 BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
            )?;
            Ok(())
        })
        .unwrap();
    let fake = FakeTransport::new()
        .catalog(&us(), &json!({ "1": { "id": "01007EF00011E000" } }))
        .catalog(&jp(), &json!({ "1": { "id": "0100000000010000" } }));
    let orch = orchestrator(&store, fake, dir.path(), config(vec![us(), jp()], 1000));

    let result = orch.run_catalog_sync().await;

    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("disk full"));
    let jp_url = nlib_sync::catalog_url(common::CATALOG_BASE, &jp());
    assert_eq!(orch.transport().calls(&jp_url), 0);

    let audit = audit_entries(&store);
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].status, SyncStatus::Failed);
    assert_eq!(audit[0].games_count, 0);
}

#[tokio::test]
async fn media_is_acquired_once_across_runs() {
    let store = CatalogStore::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let icon = "https://img.test/zelda-icon.jpg";
    let fake = FakeTransport::new()
        .catalog(
            &us(),
            &json!({ "1": { "id": "01007EF00011E000", "iconUrl": icon, "bannerUrl": "" } }),
        )
        .bytes(icon, b"icon");
    let orch = orchestrator(&store, fake, dir.path(), config(vec![us()], 1000));

    let first = orch.run_catalog_sync().await;
    let second = orch.run_catalog_sync().await;

    assert_eq!((first.media_downloaded, first.assets_fetched), (1, 1));
    assert_eq!((second.media_downloaded, second.assets_fetched), (1, 0));
    assert_eq!(orch.transport().calls(icon), 1);
    assert!(dir.path().join("01007EF00011E000").join("icon").exists());
}

#[tokio::test]
async fn overlapping_trigger_of_same_job_is_skipped() {
    let store = CatalogStore::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let gated = GatedTransport {
        inner: FakeTransport::new().text(SEED_URL, "0100000000010000|1\n"),
        ..Default::default()
    };
    let started = Arc::clone(&gated.started);
    let release = Arc::clone(&gated.release);
    let orch = Arc::new(orchestrator(&store, gated, dir.path(), config(vec![], 1000)));

    let running = Arc::clone(&orch);
    let first = tokio::spawn(async move { running.run_identifier_sync().await });
    started.notified().await;
    assert!(orch.is_running(nlib_core::SyncJob::IdentifierSeed));

    let skipped = orch.run_identifier_sync().await;
    assert!(!skipped.success);
    assert!(skipped.error.as_deref().unwrap().contains("already running"));

    release.notify_one();
    let first = first.await.unwrap();
    assert!(first.success);
    assert!(!orch.is_running(nlib_core::SyncJob::IdentifierSeed));

    let audit = audit_entries(&store);
    assert_eq!(audit.len(), 1);
    assert_eq!(audit[0].status, SyncStatus::Success);
}

#[tokio::test]
async fn startup_run_seeds_before_enriching() {
    let store = CatalogStore::open_memory().unwrap();
    let dir = tempfile::tempdir().unwrap();
    let fake = FakeTransport::new()
        .text(SEED_URL, "0100000000010000|1\n")
        .catalog(&us(), &json!({ "1": { "id": "0100000000010000", "name": "Mario" } }));
    let orch = orchestrator(&store, fake, dir.path(), config(vec![us()], 1000));

    let (ids, catalog) = run_startup(&orch).await;

    assert!(ids.success && catalog.success);
    assert_eq!(ids.added, 1);
    assert_eq!(catalog.added, 0);
    assert_eq!(catalog.updated, 1);

    let audit = audit_entries(&store);
    let sources: Vec<_> = audit.iter().rev().map(|e| e.source.as_str()).collect();
    assert_eq!(sources, vec!["identifier-seed", "catalog-multi"]);
}
