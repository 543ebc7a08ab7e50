//! Region/language catalog sources and their priority order.

use serde::{Deserialize, Serialize};

/// One remote catalog feed, scoped to a region and a language.
///
/// Lower `priority` runs first, so its values win any field that is still
/// empty when it is merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogSource {
    pub region: String,
    pub language: String,
    pub priority: u32,
}

impl CatalogSource {
    pub fn new(region: &str, language: &str, priority: u32) -> Self {
        Self {
            region: region.to_string(),
            language: language.to_string(),
            priority,
        }
    }

    /// Short tag used in logs, e.g. `US.en`.
    pub fn tag(&self) -> String {
        format!("{}.{}", self.region, self.language)
    }

    /// Name of the JSON document for this source, e.g. `US.en.json`.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.tag())
    }
}

/// Built-in source list. English feeds first, US ahead of GB and AU.
pub fn default_sources() -> Vec<CatalogSource> {
    [
        ("US", "en"),
        ("GB", "en"),
        ("AU", "en"),
        ("JP", "ja"),
        ("ES", "es"),
        ("DE", "de"),
        ("FR", "fr"),
        ("NL", "nl"),
        ("BR", "pt"),
        ("IT", "it"),
        ("CN", "zh"),
        ("KR", "ko"),
        ("RU", "ru"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (region, lang))| CatalogSource::new(region, lang, i as u32 + 1))
    .collect()
}

/// Sort sources by ascending priority. Equal priorities keep their order.
pub fn sort_by_priority(sources: &mut [CatalogSource]) {
    sources.sort_by_key(|s| s.priority);
}
