mod common;

use std::time::Duration;

use common::FakeTransport;
use nlib_core::MediaRefs;
use nlib_sync::{MediaLibrary, MediaOutcome};

const ID: &str = "01007EF00011E000";
const ICON: &str = "https://img.test/icon.jpg";
const BANNER: &str = "https://img.test/banner.jpg";
const SHOT_1: &str = "https://img.test/s1.jpg";
const SHOT_2: &str = "https://img.test/s2.jpg";

fn refs() -> MediaRefs {
    MediaRefs {
        icon_url: Some(ICON.to_string()),
        banner_url: Some(BANNER.to_string()),
        screenshots: vec![Some(SHOT_1.to_string()), Some(SHOT_2.to_string())],
    }
}

fn transport() -> FakeTransport {
    FakeTransport::new()
        .bytes(ICON, b"icon-bytes")
        .bytes(BANNER, b"banner-bytes")
        .bytes(SHOT_1, b"shot-1")
        .bytes(SHOT_2, b"shot-2")
}

#[tokio::test]
async fn downloads_all_assets_into_title_directory() {
    let dir = tempfile::tempdir().unwrap();
    let library = MediaLibrary::new(dir.path(), Duration::from_secs(5));
    let fake = transport();

    let outcome = library.acquire(&fake, ID, &refs()).await;
    assert_eq!(
        outcome,
        MediaOutcome {
            icon: true,
            banner: true,
            screenshots_stored: 2,
            fetched: 4,
        }
    );

    let title_dir = dir.path().join(ID);
    assert_eq!(std::fs::read(title_dir.join("icon")).unwrap(), b"icon-bytes");
    assert_eq!(std::fs::read(title_dir.join("banner")).unwrap(), b"banner-bytes");
    assert_eq!(
        std::fs::read(title_dir.join("screens").join("screen_2")).unwrap(),
        b"shot-2"
    );
    assert!(!title_dir.join("icon.part").exists());
}

#[tokio::test]
async fn existing_icon_is_never_fetched_again() {
    let dir = tempfile::tempdir().unwrap();
    let library = MediaLibrary::new(dir.path(), Duration::from_secs(5));
    let fake = transport();
    let icon_only = MediaRefs {
        icon_url: Some(ICON.to_string()),
        ..Default::default()
    };

    let first = library.acquire(&fake, ID, &icon_only).await;
    let second = library.acquire(&fake, ID, &icon_only).await;

    assert!(first.icon && second.icon);
    assert_eq!(first.fetched, 1);
    assert_eq!(second.fetched, 0);
    assert_eq!(fake.calls(ICON), 1);
}

#[tokio::test]
async fn existing_files_are_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let library = MediaLibrary::new(dir.path(), Duration::from_secs(5));
    let shot = library.screenshot_path(ID, 1);
    std::fs::create_dir_all(shot.parent().unwrap()).unwrap();
    std::fs::write(&shot, b"original").unwrap();

    let changed = MediaRefs {
        screenshots: vec![Some("https://img.test/new-first-shot.jpg".to_string())],
        ..Default::default()
    };
    let fake = FakeTransport::new().bytes("https://img.test/new-first-shot.jpg", b"new");
    let outcome = library.acquire(&fake, ID, &changed).await;

    assert_eq!(outcome.screenshots_stored, 1);
    assert_eq!(outcome.fetched, 0);
    assert_eq!(fake.total_calls(), 0);
    assert_eq!(std::fs::read(&shot).unwrap(), b"original");
}

#[tokio::test]
async fn failed_asset_does_not_block_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let library = MediaLibrary::new(dir.path(), Duration::from_secs(5));
    let fake = FakeTransport::new()
        .status(ICON, 500)
        .bytes(BANNER, b"banner-bytes")
        .bytes(SHOT_2, b"shot-2");

    let outcome = library.acquire(&fake, ID, &refs()).await;

    assert!(!outcome.icon);
    assert!(outcome.banner);
    assert_eq!(outcome.screenshots_stored, 1);
    assert!(outcome.any());
    assert!(!library.icon_path(ID).exists());
    assert!(!library.screenshot_path(ID, 1).exists());
    assert!(library.screenshot_path(ID, 2).exists());
}

#[tokio::test]
async fn missing_urls_issue_no_requests() {
    let dir = tempfile::tempdir().unwrap();
    let library = MediaLibrary::new(dir.path(), Duration::from_secs(5));
    let fake = FakeTransport::new();

    let outcome = library.acquire(&fake, ID, &MediaRefs::default()).await;

    assert_eq!(outcome, MediaOutcome::default());
    assert!(!outcome.any());
    assert_eq!(fake.total_calls(), 0);
}

#[tokio::test]
async fn blank_screenshot_slot_keeps_later_numbering() {
    let dir = tempfile::tempdir().unwrap();
    let library = MediaLibrary::new(dir.path(), Duration::from_secs(5));
    let fake = transport();
    let gapped = MediaRefs {
        screenshots: vec![None, Some(SHOT_2.to_string())],
        ..Default::default()
    };

    let outcome = library.acquire(&fake, ID, &gapped).await;

    assert_eq!(outcome.screenshots_stored, 1);
    assert!(!library.screenshot_path(ID, 1).exists());
    assert_eq!(
        std::fs::read(library.screenshot_path(ID, 2)).unwrap(),
        b"shot-2"
    );
}
