//! Match cache: normalized-identity keys, TTL-based validity, and a
//! JSON-file-backed key-value store for accepted matches.

use chrono::{DateTime, Duration, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::services::matcher::normalizer::normalize;
use crate::services::matcher::types::{Catalog, Item};

/// One remembered dual-catalog match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheEntry {
    #[serde(default)]
    pub primary_id: Option<String>,
    #[serde(default)]
    pub primary_name: Option<String>,
    #[serde(default)]
    pub secondary_id: Option<String>,
    #[serde(default)]
    pub secondary_name: Option<String>,
    /// RFC 3339 UTC timestamp of the last write. Kept as text so a
    /// malformed value invalidates this entry instead of the whole store.
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl CacheEntry {
    pub fn id_for(&self, catalog: Catalog) -> Option<&str> {
        let id = match catalog {
            Catalog::Primary => self.primary_id.as_deref(),
            Catalog::Secondary => self.secondary_id.as_deref(),
        };
        id.filter(|id| !id.is_empty())
    }

    pub fn name_for(&self, catalog: Catalog) -> Option<&str> {
        match catalog {
            Catalog::Primary => self.primary_name.as_deref(),
            Catalog::Secondary => self.secondary_name.as_deref(),
        }
    }
}

/// Full cache content as persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchCacheData {
    #[serde(default)]
    pub items: HashMap<String, CacheEntry>,
}

/// Normalized identity key: name, brand, and unit hint joined with `|`,
/// leading and trailing separators stripped. Items with the same
/// normalized identity share a cache slot regardless of surface text.
pub fn cache_key(item: &Item) -> String {
    let name = normalize(item.name.as_deref().unwrap_or(""));
    let brand = normalize(item.brand.as_deref().unwrap_or(""));
    let unit = normalize(item.unit_hint.as_deref().unwrap_or(""));
    format!("{name}|{brand}|{unit}")
        .trim_matches('|')
        .to_string()
}

/// An entry is valid while `now - updated_at <= ttl_days`, boundary
/// inclusive. Missing or unparsable timestamps make it invalid; expired
/// entries are treated as absent but never proactively deleted.
pub fn entry_is_valid(entry: &CacheEntry, ttl_days: i64, now: DateTime<Utc>) -> bool {
    let Some(updated_at) = entry.updated_at.as_deref() else {
        return false;
    };
    let Ok(updated_at) = DateTime::parse_from_rfc3339(updated_at) else {
        return false;
    };
    now.signed_duration_since(updated_at.with_timezone(&Utc)) <= Duration::days(ttl_days)
}

/// Key-value persistence for accepted matches.
///
/// `load` never fails: an absent or corrupt store is a cold start.
/// `save` has whole-file overwrite semantics.
pub trait CacheStore {
    fn load(&self) -> MatchCacheData;
    fn save(&self, data: &MatchCacheData) -> Result<(), String>;
}

/// JSON-file-backed cache store.
#[derive(Debug, Clone)]
pub struct JsonFileCache {
    path: PathBuf,
}

impl JsonFileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CacheStore for JsonFileCache {
    fn load(&self) -> MatchCacheData {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return MatchCacheData::default(),
        };

        match serde_json::from_str(&content) {
            Ok(data) => data,
            Err(e) => {
                warn!(
                    "Unreadable match cache at {}: {e}; starting cold",
                    self.path.display()
                );
                MatchCacheData::default()
            }
        }
    }

    fn save(&self, data: &MatchCacheData) -> Result<(), String> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| format!("Failed to serialize match cache: {e}"))?;
        fs::write(&self.path, json).map_err(|e| format!("Failed to write match cache: {e}"))
    }
}
