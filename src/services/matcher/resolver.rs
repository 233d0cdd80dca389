//! Resolution orchestration.
//!
//! Per item, per catalog: manual override, then cache, then search +
//! score + decide. Batch results aggregate both catalogs' outcomes.

use chrono::{DateTime, Utc};
use log::debug;

use crate::services::matcher::cache::{cache_key, entry_is_valid, CacheEntry, CacheStore};
use crate::services::matcher::decision::decide;
use crate::services::matcher::report::{
    BatchReport, ItemMatchDetail, MatchSummary, PurchaseRecord, UnresolvedItem,
};
use crate::services::matcher::scoring::score_candidate;
use crate::services::matcher::types::{
    CandidateProduct, Catalog, CatalogPair, Confidence, Item, MatchSettings, Resolution,
};
use crate::types::errors::{MatchError, MatchResult};

/// Candidate retrieval contract, implemented per catalog by the caller.
///
/// Zero results are an empty list, not an error. An `Err` is a hard
/// failure for that (item, catalog) pair and aborts the batch; the engine
/// never retries and never masks it as "unresolved".
pub trait ProductSearch {
    fn search(&self, query: &str, limit: usize) -> Result<Vec<CandidateProduct>, String>;
}

/// Resolve one item against one catalog.
///
/// A manual id wins over everything; a valid cache entry wins over search.
pub fn resolve_catalog_match(
    catalog: Catalog,
    item: &Item,
    settings: &MatchSettings,
    searcher: &dyn ProductSearch,
    cached_entry: Option<&CacheEntry>,
    allow_cache: bool,
    now: DateTime<Utc>,
) -> MatchResult<Resolution> {
    if let Some(manual_id) = item.manual_id(catalog) {
        return Ok(Resolution::manual(manual_id));
    }

    if allow_cache {
        if let Some(entry) = cached_entry {
            if entry_is_valid(entry, settings.cache_ttl_days, now) {
                if let Some(id) = entry.id_for(catalog) {
                    debug!("cache hit for {catalog} catalog: {id}");
                    return Ok(Resolution::cached(id, entry.name_for(catalog)));
                }
            }
        }
    }

    let Some(query) = item.query() else {
        return Ok(Resolution::missing_query());
    };

    let mut candidates = searcher
        .search(query, settings.search_limit)
        .map_err(|detail| MatchError::Search { catalog, detail })?;
    candidates.truncate(settings.search_limit);

    let scored = candidates
        .iter()
        .map(|product| score_candidate(item, product, settings))
        .collect();
    Ok(decide(scored, settings))
}

/// Match a batch of items against both catalogs.
///
/// The cache store, when given, is read once before the batch. An entry is
/// written back only when both catalogs resolved an item with plain high
/// confidence (not manual, not already cached), and the store is saved
/// once, after the batch, iff at least one fresh entry was written.
pub fn match_items(
    items: &[Item],
    searchers: CatalogPair<&dyn ProductSearch>,
    cache_store: Option<&dyn CacheStore>,
    settings: &MatchSettings,
) -> MatchResult<BatchReport> {
    let now = Utc::now();
    let allow_cache = cache_store.is_some();
    let mut cache = cache_store.map(|store| store.load()).unwrap_or_default();

    let mut details = Vec::with_capacity(items.len());
    let mut resolved_items = Vec::new();
    let mut unresolved_items = Vec::new();
    let mut cache_hits = 0usize;
    let mut cache_dirty = false;

    for item in items {
        let key = cache_key(item);
        let cached_entry = cache.items.get(&key).cloned();

        let primary = resolve_catalog_match(
            Catalog::Primary,
            item,
            settings,
            searchers.primary,
            cached_entry.as_ref(),
            allow_cache,
            now,
        )?;
        let secondary = resolve_catalog_match(
            Catalog::Secondary,
            item,
            settings,
            searchers.secondary,
            cached_entry.as_ref(),
            allow_cache,
            now,
        )?;

        cache_hits += usize::from(primary.from_cache) + usize::from(secondary.from_cache);

        let resolved = {
            let selected_pair = if primary.resolved && secondary.resolved {
                primary.selected.as_ref().zip(secondary.selected.as_ref())
            } else {
                None
            };

            if let Some((primary_sel, secondary_sel)) = selected_pair {
                resolved_items.push(PurchaseRecord {
                    name: item.name.clone(),
                    qty: item.qty,
                    primary_id: primary_sel.id.clone(),
                    secondary_id: secondary_sel.id.clone(),
                });

                let fresh = primary.confidence == Confidence::High
                    && secondary.confidence == Confidence::High;
                if allow_cache && fresh && !key.is_empty() {
                    cache.items.insert(
                        key.clone(),
                        CacheEntry {
                            primary_id: Some(primary_sel.id.clone()),
                            primary_name: primary_sel.name.clone(),
                            secondary_id: Some(secondary_sel.id.clone()),
                            secondary_name: secondary_sel.name.clone(),
                            updated_at: Some(now.to_rfc3339()),
                        },
                    );
                    cache_dirty = true;
                }
                true
            } else {
                unresolved_items.push(UnresolvedItem {
                    name: item.name.clone(),
                    qty: item.qty,
                    confidence: CatalogPair::new(primary.confidence, secondary.confidence),
                    reason: CatalogPair::new(primary.reason, secondary.reason),
                });
                false
            }
        };

        details.push(ItemMatchDetail {
            input: item.clone(),
            cache_key: key,
            resolved,
            matches: CatalogPair::new(primary, secondary),
        });
    }

    if cache_dirty {
        if let Some(store) = cache_store {
            store.save(&cache).map_err(MatchError::Store)?;
        }
    }

    Ok(BatchReport {
        settings: settings.clone(),
        summary: MatchSummary {
            total: items.len(),
            resolved: resolved_items.len(),
            unresolved: unresolved_items.len(),
            cache_hits,
        },
        items: details,
        resolved_items,
        unresolved_items,
    })
}
