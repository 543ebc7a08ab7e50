//! Enrichment entries as published by the remote catalog sources.
//!
//! Source JSON is loose: every field may be absent, `null`, or empty. The
//! entry is read as-is, then turned into the typed field sets the store
//! writes (`TitleFields`, `DescriptionFields`) and the media references the
//! downloader consumes (`MediaRefs`). Empty strings, empty lists, and zero
//! counts are treated as "not provided" so they never block a later source
//! from filling the field.

use serde::{Deserialize, Deserializer};

/// One entry of a source catalog, keyed in the payload by an opaque numeric id.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogEntry {
    pub id: Option<String>,
    pub nsu_id: Option<i64>,
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub developer: Option<String>,
    /// Raw `YYYYMMDD` value, published as either a number or a string.
    #[serde(deserialize_with = "lenient_date")]
    pub release_date: Option<String>,
    pub category: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub number_of_players: Option<i64>,
    pub rating_content: Option<Vec<String>>,
    pub rights_id: Option<String>,
    pub region: Option<String>,
    pub is_demo: Option<bool>,
    pub version: Option<i64>,
    pub intro: Option<String>,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub banner_url: Option<String>,
    pub screenshots: Option<Vec<Option<String>>>,
}

/// Shared metadata written to the title record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleFields {
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub developer: Option<String>,
    /// Normalized `YYYY-MM-DD`.
    pub release_date: Option<String>,
    pub category: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub nsu_id: Option<i64>,
    pub number_of_players: Option<i64>,
    pub rating_content: Option<Vec<String>>,
    pub rights_id: Option<String>,
    pub region: Option<String>,
    pub is_demo: Option<bool>,
    pub version: i64,
}

/// Language-specific text written to the description record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptionFields {
    pub intro: Option<String>,
    pub description: Option<String>,
}

/// Media URLs carried by an entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaRefs {
    pub icon_url: Option<String>,
    pub banner_url: Option<String>,
    /// Screenshot URLs by source position. `None` marks a blank slot, which
    /// still occupies its `screen_N` index.
    pub screenshots: Vec<Option<String>>,
}

impl MediaRefs {
    pub fn is_empty(&self) -> bool {
        self.icon_url.is_none() && self.banner_url.is_none()
            && self.screenshots.iter().all(Option::is_none)
    }
}

impl CatalogEntry {
    /// Metadata fields for the title record.
    ///
    /// `key` is the entry's key in the source payload; when numeric it stands
    /// in for a missing `nsuId`.
    pub fn title_fields(&self, key: &str) -> TitleFields {
        TitleFields {
            name: non_empty(&self.name),
            publisher: non_empty(&self.publisher),
            developer: non_empty(&self.developer),
            release_date: normalize_release_date(self.release_date.as_deref()),
            category: non_empty_list(&self.category),
            languages: non_empty_list(&self.languages),
            nsu_id: self
                .nsu_id
                .filter(|n| *n != 0)
                .or_else(|| key.parse::<i64>().ok().filter(|n| *n != 0)),
            number_of_players: self.number_of_players.filter(|n| *n != 0),
            rating_content: non_empty_list(&self.rating_content),
            rights_id: non_empty(&self.rights_id),
            region: non_empty(&self.region),
            is_demo: self.is_demo,
            version: self.version.unwrap_or(0),
        }
    }

    pub fn description_fields(&self) -> DescriptionFields {
        DescriptionFields {
            intro: non_empty(&self.intro),
            description: non_empty(&self.description),
        }
    }

    /// Media references, or `None` when the entry carries no usable URL.
    pub fn media_refs(&self) -> Option<MediaRefs> {
        let refs = MediaRefs {
            icon_url: non_empty(&self.icon_url),
            banner_url: non_empty(&self.banner_url),
            screenshots: self
                .screenshots
                .iter()
                .flatten()
                .map(non_empty)
                .collect(),
        };
        if refs.is_empty() { None } else { Some(refs) }
    }
}

/// Rewrite an 8-digit `YYYYMMDD` date as `YYYY-MM-DD`.
///
/// Anything else, including other lengths and non-digit input, yields `None`.
pub fn normalize_release_date(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}-{}-{}", &raw[0..4], &raw[4..6], &raw[6..8]))
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

fn non_empty_list(value: &Option<Vec<String>>) -> Option<Vec<String>> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

#[cfg(test)]
#[path = "tests/entry_tests.rs"]
mod tests;
