//! Domain types for the matching engine.
//!
//! Contains: Catalog, CatalogPair, Item, CandidateProduct, MatchSettings,
//! Confidence, MatchReason, ScoreBreakdown, ScoredCandidate, Resolution.

use serde::{Deserialize, Serialize};

/// One of the two independent product catalogs being matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Catalog {
    Primary,
    Secondary,
}

impl std::fmt::Display for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Catalog::Primary => write!(f, "primary"),
            Catalog::Secondary => write!(f, "secondary"),
        }
    }
}

/// A value held once per catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogPair<T> {
    pub primary: T,
    pub secondary: T,
}

impl<T> CatalogPair<T> {
    pub fn new(primary: T, secondary: T) -> Self {
        Self { primary, secondary }
    }

    pub fn get(&self, catalog: Catalog) -> &T {
        match catalog {
            Catalog::Primary => &self.primary,
            Catalog::Secondary => &self.secondary,
        }
    }
}

/// One shopping-list entry as supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub name: Option<String>,
    /// Requested quantity; `sanitized` clamps values below 1.
    #[serde(default = "default_qty", alias = "quantity")]
    pub qty: u32,
    #[serde(default)]
    pub brand: Option<String>,
    /// Free-text size hint, e.g. "500g" or "2x1l".
    #[serde(default, alias = "unit", alias = "size")]
    pub unit_hint: Option<String>,
    /// Pre-resolved id for the primary catalog; bypasses matching entirely.
    #[serde(default)]
    pub primary_id: Option<String>,
    /// Pre-resolved id for the secondary catalog; bypasses matching entirely.
    #[serde(default)]
    pub secondary_id: Option<String>,
}

fn default_qty() -> u32 {
    1
}

impl Default for Item {
    fn default() -> Self {
        Self {
            name: None,
            qty: 1,
            brand: None,
            unit_hint: None,
            primary_id: None,
            secondary_id: None,
        }
    }
}

impl Item {
    pub fn from_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::default()
        }
    }

    /// Trim free-text fields, treat empty strings as absent, clamp qty to 1.
    pub fn sanitized(mut self) -> Self {
        self.name = trimmed(self.name);
        self.brand = trimmed(self.brand);
        self.unit_hint = trimmed(self.unit_hint);
        self.primary_id = trimmed(self.primary_id);
        self.secondary_id = trimmed(self.secondary_id);
        self.qty = self.qty.max(1);
        self
    }

    /// Search query for catalog lookups; `None` when the item has no usable name.
    pub fn query(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }

    pub fn manual_id(&self, catalog: Catalog) -> Option<&str> {
        match catalog {
            Catalog::Primary => self.primary_id.as_deref(),
            Catalog::Secondary => self.secondary_id.as_deref(),
        }
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A product record returned by a catalog search. Owned by the catalog,
/// never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    /// Free-text package size as reported by the catalog, e.g. "1.5 l".
    #[serde(default)]
    pub unit_size: Option<String>,
    /// `None` means the catalog did not report availability.
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub is_bonus: bool,
}

/// Tunable matching thresholds. Every field has a default, so partial
/// config input deserializes cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchSettings {
    /// Max candidates requested per catalog search.
    pub search_limit: usize,
    /// Minimum top score for automatic acceptance.
    pub auto_accept_score: f64,
    /// Minimum lead over the runner-up for automatic acceptance.
    pub min_score_gap: f64,
    /// Break near-ties in favor of promotional items.
    pub prefer_bonus_tiebreak: bool,
    pub cache_ttl_days: i64,
    /// Max runner-up candidates kept per resolution.
    pub max_alternatives: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            search_limit: 8,
            auto_accept_score: 72.0,
            min_score_gap: 8.0,
            prefer_bonus_tiebreak: true,
            cache_ttl_days: 21,
            max_alternatives: 3,
        }
    }
}

/// Reliability tier of a resolution. Ordered from least to most reliable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
    HighCached,
    Manual,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
            Confidence::HighCached => write!(f, "high_cached"),
            Confidence::Manual => write!(f, "manual"),
        }
    }
}

/// Machine-readable explanation for a resolution outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    ManualId,
    CacheHit,
    HighConfidence,
    ScoreGapTooSmall,
    ScoreBelowAutoAccept,
    LowScore,
    NoCandidates,
    MissingQuery,
}

impl std::fmt::Display for MatchReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MatchReason::ManualId => "manual_id",
            MatchReason::CacheHit => "cache_hit",
            MatchReason::HighConfidence => "high_confidence",
            MatchReason::ScoreGapTooSmall => "score_gap_too_small",
            MatchReason::ScoreBelowAutoAccept => "score_below_auto_accept",
            MatchReason::LowScore => "low_score",
            MatchReason::NoCandidates => "no_candidates",
            MatchReason::MissingQuery => "missing_query",
        };
        write!(f, "{label}")
    }
}

/// Name similarity internals, kept for explainability.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct NameSignals {
    pub token_overlap: f64,
    pub sequence_ratio: f64,
    pub exact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitReason {
    NoQueryUnitHint,
    MissingCandidateUnit,
    UnitMismatch,
    InvalidQueryUnit,
    UnitClose,
    UnitReasonable,
    UnitFar,
    UnitVeryFar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandReason {
    NoBrandHint,
    BrandMatch,
    BrandMismatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityReason {
    NotAvailable,
    AvailableOrUnknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusReason {
    BonusTiebreakDisabled,
    BonusTiebreak,
    NoBonus,
}

/// Per-candidate record of sub-scores and their categorical reasons.
/// Produced fresh on every scoring call, even for a zero total.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub name: f64,
    pub unit: f64,
    pub brand: f64,
    pub availability: f64,
    pub bonus_tiebreak: f64,
    pub name_signals: NameSignals,
    pub unit_reason: UnitReason,
    pub brand_reason: BrandReason,
    pub availability_reason: AvailabilityReason,
    pub bonus_reason: BonusReason,
}

/// A candidate with its aggregate score attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub unit_size: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub is_bonus: bool,
    pub score: f64,
    /// Absent for manual and cached selections.
    #[serde(default)]
    pub breakdown: Option<ScoreBreakdown>,
}

impl ScoredCandidate {
    /// A selection fixed outside of scoring (manual override or cache hit).
    pub(crate) fn pinned(id: &str, name: Option<&str>, score: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.map(|n| n.to_string()),
            brand: None,
            unit_size: None,
            available: None,
            is_bonus: false,
            score,
            breakdown: None,
        }
    }
}

/// Outcome of resolving one item against one catalog. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    pub resolved: bool,
    pub confidence: Confidence,
    pub score: f64,
    pub score_gap: f64,
    pub selected: Option<ScoredCandidate>,
    pub alternatives: Vec<ScoredCandidate>,
    pub reason: MatchReason,
    pub from_cache: bool,
}

impl Resolution {
    pub(crate) fn manual(id: &str) -> Self {
        Self {
            resolved: true,
            confidence: Confidence::Manual,
            score: 100.0,
            score_gap: 100.0,
            selected: Some(ScoredCandidate::pinned(id, None, 100.0)),
            alternatives: Vec::new(),
            reason: MatchReason::ManualId,
            from_cache: false,
        }
    }

    pub(crate) fn cached(id: &str, name: Option<&str>) -> Self {
        Self {
            resolved: true,
            confidence: Confidence::HighCached,
            score: 95.0,
            score_gap: 95.0,
            selected: Some(ScoredCandidate::pinned(id, name, 95.0)),
            alternatives: Vec::new(),
            reason: MatchReason::CacheHit,
            from_cache: true,
        }
    }

    pub(crate) fn missing_query() -> Self {
        Self {
            resolved: false,
            confidence: Confidence::Low,
            score: 0.0,
            score_gap: 0.0,
            selected: None,
            alternatives: Vec::new(),
            reason: MatchReason::MissingQuery,
            from_cache: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_sanitized_clamps_and_trims() {
        let item = Item {
            name: Some("  melk  ".to_string()),
            qty: 0,
            brand: Some("   ".to_string()),
            ..Item::default()
        }
        .sanitized();

        assert_eq!(item.name.as_deref(), Some("melk"));
        assert_eq!(item.qty, 1);
        assert!(item.brand.is_none());
    }

    #[test]
    fn test_item_accepts_aliased_fields() {
        let item: Item =
            serde_json::from_str(r#"{"name":"cola","quantity":2,"unit":"1.5l"}"#).unwrap();
        assert_eq!(item.qty, 2);
        assert_eq!(item.unit_hint.as_deref(), Some("1.5l"));
    }

    #[test]
    fn test_item_query_requires_usable_name() {
        assert!(Item::default().query().is_none());
        assert_eq!(Item::from_name("kaas").query(), Some("kaas"));
    }

    #[test]
    fn test_settings_defaults() {
        let settings: MatchSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.search_limit, 8);
        assert_eq!(settings.auto_accept_score, 72.0);
        assert_eq!(settings.min_score_gap, 8.0);
        assert!(settings.prefer_bonus_tiebreak);
        assert_eq!(settings.cache_ttl_days, 21);
        assert_eq!(settings.max_alternatives, 3);
    }

    #[test]
    fn test_confidence_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Confidence::HighCached).unwrap(),
            "\"high_cached\""
        );
        assert_eq!(
            serde_json::to_string(&MatchReason::ScoreGapTooSmall).unwrap(),
            "\"score_gap_too_small\""
        );
    }

    #[test]
    fn test_confidence_ordering() {
        assert!(Confidence::Low < Confidence::Medium);
        assert!(Confidence::Medium < Confidence::High);
        assert!(Confidence::High < Confidence::HighCached);
        assert!(Confidence::HighCached < Confidence::Manual);
    }
}
