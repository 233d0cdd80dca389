//! Grocery item matching engine.
//!
//! Resolves free-text item descriptions against candidate products from
//! two independent catalogs: normalize text, extract unit hints, score
//! candidates, classify confidence, and cache accepted matches.

pub mod cache;
pub mod decision;
pub mod normalizer;
pub mod report;
pub mod resolver;
pub mod scoring;
pub mod types;
pub mod units;

// Public surface used by callers.
pub use cache::{cache_key, entry_is_valid, CacheEntry, CacheStore, JsonFileCache, MatchCacheData};
pub use decision::decide;
pub use report::{
    aggregate_purchases, BatchReport, ItemMatchDetail, MatchSummary, PurchaseLine, PurchaseRecord,
    UnresolvedItem,
};
pub use resolver::{match_items, resolve_catalog_match, ProductSearch};
pub use scoring::score_candidate;
pub use types::{
    CandidateProduct, Catalog, CatalogPair, Confidence, Item, MatchReason, MatchSettings,
    Resolution, ScoreBreakdown, ScoredCandidate,
};
pub use units::{extract_unit_hint, parse_unit_hint, CanonicalUnit, UnitHint};
