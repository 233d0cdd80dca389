//! Batch result records and purchase aggregation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::services::matcher::types::{
    Catalog, CatalogPair, Confidence, Item, MatchReason, MatchSettings, Resolution,
};

/// Totals for one matched batch. Each catalog's cache hit counts
/// independently, so a dual-hit item contributes 2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    pub total: usize,
    pub resolved: usize,
    pub unresolved: usize,
    pub cache_hits: usize,
}

/// Full per-item outcome for both catalogs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMatchDetail {
    pub input: Item,
    pub cache_key: String,
    pub resolved: bool,
    pub matches: CatalogPair<Resolution>,
}

/// Canonical purchase record for a dual-resolved item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub name: Option<String>,
    pub qty: u32,
    pub primary_id: String,
    pub secondary_id: String,
}

impl PurchaseRecord {
    pub fn id_for(&self, catalog: Catalog) -> &str {
        match catalog {
            Catalog::Primary => &self.primary_id,
            Catalog::Secondary => &self.secondary_id,
        }
    }
}

/// An item that failed dual-catalog resolution, with per-catalog context
/// for human adjudication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnresolvedItem {
    pub name: Option<String>,
    pub qty: u32,
    pub confidence: CatalogPair<Confidence>,
    pub reason: CatalogPair<MatchReason>,
}

/// Structured output of a batch match, suitable for direct serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub settings: MatchSettings,
    pub summary: MatchSummary,
    pub items: Vec<ItemMatchDetail>,
    pub resolved_items: Vec<PurchaseRecord>,
    pub unresolved_items: Vec<UnresolvedItem>,
}

/// One line of a per-catalog order batch after merging duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLine {
    pub id: String,
    pub qty: u32,
    pub name: Option<String>,
}

/// Merge purchase records for one catalog, summing quantities per product
/// id. Lines come back ordered by id.
pub fn aggregate_purchases(records: &[PurchaseRecord], catalog: Catalog) -> Vec<PurchaseLine> {
    let mut lines: BTreeMap<&str, PurchaseLine> = BTreeMap::new();
    for record in records {
        let id = record.id_for(catalog);
        let line = lines.entry(id).or_insert_with(|| PurchaseLine {
            id: id.to_string(),
            qty: 0,
            name: None,
        });
        line.qty += record.qty;
        if line.name.is_none() {
            line.name = record.name.clone();
        }
    }
    lines.into_values().collect()
}
