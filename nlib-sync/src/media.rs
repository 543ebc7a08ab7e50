//! Media acquisition for one title at a time.
//!
//! Layout under the media root:
//!
//! ```text
//! <root>/<id>/icon
//! <root>/<id>/banner
//! <root>/<id>/screens/screen_1
//! <root>/<id>/screens/screen_2
//! ```
//!
//! Presence is checked by existence only. A file that exists is never
//! fetched again or overwritten.

use std::path::{Path, PathBuf};
use std::time::Duration;

use nlib_core::MediaRefs;

use crate::client::Transport;

/// Per-title media result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MediaOutcome {
    /// Icon present after the call.
    pub icon: bool,
    /// Banner present after the call.
    pub banner: bool,
    /// Screenshots present after the call.
    pub screenshots_stored: usize,
    /// Assets newly downloaded by this call.
    pub fetched: usize,
}

impl MediaOutcome {
    /// Whether any asset of the title is available.
    pub fn any(&self) -> bool {
        self.icon || self.banner || self.screenshots_stored > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetState {
    Present,
    Fetched,
    Unavailable,
}

impl AssetState {
    fn stored(self) -> bool {
        !matches!(self, Self::Unavailable)
    }

    fn fetched(self) -> usize {
        usize::from(self == Self::Fetched)
    }
}

/// The on-disk media tree.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    root: PathBuf,
    timeout: Duration,
}

impl MediaLibrary {
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn title_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    pub fn icon_path(&self, id: &str) -> PathBuf {
        self.title_dir(id).join("icon")
    }

    pub fn banner_path(&self, id: &str) -> PathBuf {
        self.title_dir(id).join("banner")
    }

    /// Path of the screenshot at 1-based `index`.
    pub fn screenshot_path(&self, id: &str, index: usize) -> PathBuf {
        self.title_dir(id)
            .join("screens")
            .join(format!("screen_{}", index))
    }

    /// Fetch whatever assets of `id` are still missing.
    ///
    /// Icon, banner and the screenshot list run concurrently. Screenshots run
    /// in order, one at a time, and keep their source position as `screen_N`
    /// even when earlier slots are blank. A failing asset never affects the others.
    pub async fn acquire<T: Transport>(
        &self,
        transport: &T,
        id: &str,
        refs: &MediaRefs,
    ) -> MediaOutcome {
        let icon_path = self.icon_path(id);
        let banner_path = self.banner_path(id);
        let (icon, banner, (screenshots_stored, screens_fetched)) = tokio::join!(
            self.fetch_asset(transport, refs.icon_url.as_deref(), &icon_path),
            self.fetch_asset(transport, refs.banner_url.as_deref(), &banner_path),
            self.fetch_screenshots(transport, id, &refs.screenshots),
        );

        MediaOutcome {
            icon: icon.stored(),
            banner: banner.stored(),
            screenshots_stored,
            fetched: icon.fetched() + banner.fetched() + screens_fetched,
        }
    }

    async fn fetch_screenshots<T: Transport>(
        &self,
        transport: &T,
        id: &str,
        urls: &[Option<String>],
    ) -> (usize, usize) {
        let mut stored = 0;
        let mut fetched = 0;
        for (i, url) in urls.iter().enumerate() {
            let dest = self.screenshot_path(id, i + 1);
            let state = self.fetch_asset(transport, url.as_deref(), &dest).await;
            if state.stored() {
                stored += 1;
            }
            fetched += state.fetched();
        }
        (stored, fetched)
    }

    async fn fetch_asset<T: Transport>(
        &self,
        transport: &T,
        url: Option<&str>,
        dest: &Path,
    ) -> AssetState {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return AssetState::Unavailable;
        };
        if tokio::fs::try_exists(dest).await.unwrap_or(false) {
            return AssetState::Present;
        }

        let bytes = match transport.get_bytes(url, Some(self.timeout)).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("Media download failed for {}: {}", url, e);
                return AssetState::Unavailable;
            }
        };

        match write_atomic(dest, &bytes).await {
            Ok(()) => AssetState::Fetched,
            Err(e) => {
                log::debug!("Failed to write {}: {}", dest.display(), e);
                AssetState::Unavailable
            }
        }
    }
}

/// Write to a sibling temp file, then rename into place.
async fn write_atomic(dest: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = dest.with_extension("part");
    let written = match tokio::fs::write(&tmp, bytes).await {
        Ok(()) => tokio::fs::rename(&tmp, dest).await,
        Err(e) => Err(e),
    };
    if written.is_err() {
        let _ = tokio::fs::remove_file(&tmp).await;
    }
    written
}

#[cfg(test)]
#[path = "tests/media_tests.rs"]
mod tests;
