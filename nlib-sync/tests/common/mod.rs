#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nlib_core::CatalogSource;
use nlib_sync::{
    CatalogStore, FetchError, MediaLibrary, Orchestrator, SilentProgress, SyncConfig, Transport,
};
use tokio::sync::Notify;

pub const SEED_URL: &str = "https://seed.test/working.txt";
pub const CATALOG_BASE: &str = "https://catalog.test";

#[derive(Debug, Clone)]
pub enum Route {
    Text(String),
    Bytes(Vec<u8>),
    Status(u16),
}

/// In-memory transport that records every request.
#[derive(Debug, Default)]
pub struct FakeTransport {
    routes: HashMap<String, Route>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, url: &str, body: impl Into<String>) -> Self {
        self.routes.insert(url.to_string(), Route::Text(body.into()));
        self
    }

    pub fn bytes(mut self, url: &str, body: &[u8]) -> Self {
        self.routes.insert(url.to_string(), Route::Bytes(body.to_vec()));
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.routes.insert(url.to_string(), Route::Status(status));
        self
    }

    /// Serve `body` as the catalog document of `source`.
    pub fn catalog(self, source: &CatalogSource, body: &serde_json::Value) -> Self {
        let url = nlib_sync::catalog_url(CATALOG_BASE, source);
        self.text(&url, body.to_string())
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.as_str() == url)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn respond(&self, url: &str) -> Result<Route, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.routes.get(url) {
            Some(Route::Status(status)) => Err(FetchError::Status {
                status: *status,
                url: url.to_string(),
            }),
            Some(route) => Ok(route.clone()),
            None => Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}

impl Transport for FakeTransport {
    async fn get_text(&self, url: &str, _timeout: Option<Duration>) -> Result<String, FetchError> {
        match self.respond(url)? {
            Route::Text(text) => Ok(text),
            Route::Bytes(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Route::Status(status) => Err(FetchError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }

    async fn get_bytes(
        &self,
        url: &str,
        _timeout: Option<Duration>,
    ) -> Result<Vec<u8>, FetchError> {
        match self.respond(url)? {
            Route::Text(text) => Ok(text.into_bytes()),
            Route::Bytes(bytes) => Ok(bytes),
            Route::Status(status) => Err(FetchError::Status {
                status,
                url: url.to_string(),
            }),
        }
    }
}

/// Transport that blocks every text request until released.
#[derive(Debug, Default)]
pub struct GatedTransport {
    pub inner: FakeTransport,
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl Transport for GatedTransport {
    async fn get_text(&self, url: &str, timeout: Option<Duration>) -> Result<String, FetchError> {
        self.started.notify_one();
        self.release.notified().await;
        self.inner.get_text(url, timeout).await
    }

    async fn get_bytes(&self, url: &str, timeout: Option<Duration>) -> Result<Vec<u8>, FetchError> {
        self.inner.get_bytes(url, timeout).await
    }
}

pub fn config(sources: Vec<CatalogSource>, batch_size: usize) -> SyncConfig {
    SyncConfig {
        seed_url: SEED_URL.to_string(),
        catalog_base_url: CATALOG_BASE.to_string(),
        catalog_timeout: Duration::from_secs(5),
        batch_size,
        sources,
    }
}

pub fn orchestrator<T: Transport>(
    store: &CatalogStore,
    transport: T,
    media_root: &std::path::Path,
    config: SyncConfig,
) -> Orchestrator<T> {
    Orchestrator::new(
        store.clone(),
        transport,
        MediaLibrary::new(media_root, Duration::from_secs(5)),
        config,
    )
    .with_progress(Arc::new(SilentProgress))
}

pub fn audit_entries(store: &CatalogStore) -> Vec<nlib_core::SyncLogEntry> {
    store
        .with_conn(|conn| Ok(nlib_db::list_sync_logs(conn, None)?))
        .unwrap()
}
