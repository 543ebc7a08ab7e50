//! Source catalog fetcher.
//!
//! One JSON document per (region, language) source, shaped as a flat object
//! from an opaque numeric key to a loose entry. Any failure turns into
//! `None` so the caller can move on to the next source.

use std::time::{Duration, Instant};

use nlib_core::{CatalogEntry, CatalogSource};
use serde_json::{Map, Value};

use crate::client::Transport;
use crate::error::FetchError;

/// A parsed source document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CatalogPayload {
    /// `(payload key, entry)` pairs in document order.
    pub entries: Vec<(String, CatalogEntry)>,
    /// Entries whose value could not be read as a catalog entry at all.
    pub malformed: usize,
    /// Size of the downloaded body.
    pub bytes: usize,
}

impl CatalogPayload {
    /// Total number of entries in the document, readable or not.
    pub fn len(&self) -> usize {
        self.entries.len() + self.malformed
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `{base}/{REGION}.{lang}.json`
pub fn catalog_url(base_url: &str, source: &CatalogSource) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), source.file_name())
}

/// Parse a catalog document.
///
/// Only a body that is not a JSON object fails as a whole; an individual
/// entry that does not fit the entry shape is counted in `malformed`.
pub fn parse_catalog(body: &str) -> Result<CatalogPayload, FetchError> {
    let raw: Map<String, Value> = serde_json::from_str(body)?;
    let mut payload = CatalogPayload {
        bytes: body.len(),
        ..Default::default()
    };
    for (key, value) in raw {
        match serde_json::from_value::<CatalogEntry>(value) {
            Ok(entry) => payload.entries.push((key, entry)),
            Err(e) => {
                log::debug!("Unreadable catalog entry {}: {}", key, e);
                payload.malformed += 1;
            }
        }
    }
    Ok(payload)
}

/// Download and parse one source, or `None` if it is unavailable.
pub async fn fetch_catalog<T: Transport>(
    transport: &T,
    base_url: &str,
    source: &CatalogSource,
    timeout: Duration,
) -> Option<CatalogPayload> {
    let url = catalog_url(base_url, source);
    log::info!("  Downloading {}...", source.tag());
    let start = Instant::now();

    let result = match transport.get_text(&url, Some(timeout)).await {
        Ok(body) => parse_catalog(&body),
        Err(e) => Err(e),
    };

    match result {
        Ok(payload) => {
            log::info!(
                "  Loaded {} in {:.2}s ({} entries, {:.2} MB)",
                source.tag(),
                start.elapsed().as_secs_f64(),
                payload.len(),
                payload.bytes as f64 / (1024.0 * 1024.0)
            );
            Some(payload)
        }
        Err(e) => {
            log::warn!("  Error loading {}: {}", source.tag(), e);
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
