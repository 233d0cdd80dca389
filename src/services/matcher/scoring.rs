//! Candidate scoring: five independent factors summed into a total
//! clamped to [0, 100], with an explainable breakdown per candidate.

use std::collections::HashSet;

use strsim::normalized_levenshtein;

use crate::services::matcher::normalizer::{normalize, tokenize};
use crate::services::matcher::types::{
    AvailabilityReason, BonusReason, BrandReason, CandidateProduct, Item, MatchSettings,
    NameSignals, ScoreBreakdown, ScoredCandidate, UnitReason,
};
use crate::services::matcher::units::extract_unit_hint;

const SCORE_MIN: f64 = 0.0;
const SCORE_MAX: f64 = 100.0;

const W_TOKEN_OVERLAP: f64 = 60.0;
const W_SEQUENCE_RATIO: f64 = 35.0;

const UNIT_MISSING_CANDIDATE: f64 = -6.0;
const UNIT_MISMATCH: f64 = -20.0;
const UNIT_CLOSE: f64 = 15.0;
const UNIT_REASONABLE: f64 = 8.0;
const UNIT_FAR: f64 = 2.0;
const UNIT_VERY_FAR: f64 = -10.0;

const BRAND_MATCH: f64 = 10.0;
const BRAND_MISMATCH: f64 = -6.0;

const NOT_AVAILABLE: f64 = -25.0;
const BONUS_TIEBREAK: f64 = 2.0;

/// Score one candidate against an item.
pub fn score_candidate(
    item: &Item,
    product: &CandidateProduct,
    settings: &MatchSettings,
) -> ScoredCandidate {
    let (name_score, name_signals) =
        score_name(item.name.as_deref().unwrap_or(""), &product.name);
    let (unit_score, unit_reason) = score_unit(item, product);
    let (brand_score, brand_reason) = score_brand(item, product);
    let (availability_score, availability_reason) = score_availability(product);
    let (bonus_score, bonus_reason) = score_bonus(product, settings);

    let total = (name_score + unit_score + brand_score + availability_score + bonus_score)
        .clamp(SCORE_MIN, SCORE_MAX);

    ScoredCandidate {
        id: product.id.clone(),
        name: Some(product.name.clone()),
        brand: product.brand.clone(),
        unit_size: product.unit_size.clone(),
        available: product.available,
        is_bonus: product.is_bonus,
        score: round2(total),
        breakdown: Some(ScoreBreakdown {
            name: round2(name_score),
            unit: round2(unit_score),
            brand: round2(brand_score),
            availability: round2(availability_score),
            bonus_tiebreak: round2(bonus_score),
            name_signals,
            unit_reason,
            brand_reason,
            availability_reason,
            bonus_reason,
        }),
    }
}

/// Token-set overlap plus character-level sequence similarity. Exact
/// normalized equality overrides both to a full score.
fn score_name(query: &str, candidate: &str) -> (f64, NameSignals) {
    let q_norm = normalize(query);
    let c_norm = normalize(candidate);

    if q_norm.is_empty() || c_norm.is_empty() {
        return (0.0, NameSignals::default());
    }

    let exact = q_norm == c_norm;

    let q_tokens: HashSet<String> = tokenize(query).into_iter().collect();
    let c_tokens: HashSet<String> = tokenize(candidate).into_iter().collect();
    let token_overlap = if q_tokens.is_empty() || c_tokens.is_empty() {
        0.0
    } else {
        let shared = q_tokens.intersection(&c_tokens).count() as f64;
        let union = q_tokens.union(&c_tokens).count() as f64;
        shared / union
    };

    let sequence_ratio = normalized_levenshtein(&q_norm, &c_norm);

    let score = if exact {
        100.0
    } else {
        token_overlap * W_TOKEN_OVERLAP + sequence_ratio * W_SEQUENCE_RATIO
    };

    (
        score,
        NameSignals {
            token_overlap: round3(token_overlap),
            sequence_ratio: round3(sequence_ratio),
            exact,
        },
    )
}

fn score_unit(item: &Item, product: &CandidateProduct) -> (f64, UnitReason) {
    let query_hint = extract_unit_hint(&[item.unit_hint.as_deref(), item.name.as_deref()]);
    let Some(query_hint) = query_hint else {
        // Hints are optional; absence on the query side is never penalized.
        return (0.0, UnitReason::NoQueryUnitHint);
    };

    let candidate_hint =
        extract_unit_hint(&[product.unit_size.as_deref(), Some(product.name.as_str())]);
    let Some(candidate_hint) = candidate_hint else {
        return (UNIT_MISSING_CANDIDATE, UnitReason::MissingCandidateUnit);
    };

    if query_hint.unit != candidate_hint.unit {
        return (UNIT_MISMATCH, UnitReason::UnitMismatch);
    }

    if query_hint.value <= 0.0 {
        return (0.0, UnitReason::InvalidQueryUnit);
    }

    let deviation = (candidate_hint.value - query_hint.value).abs() / query_hint.value;
    if deviation <= 0.10 {
        (UNIT_CLOSE, UnitReason::UnitClose)
    } else if deviation <= 0.25 {
        (UNIT_REASONABLE, UnitReason::UnitReasonable)
    } else if deviation <= 0.50 {
        (UNIT_FAR, UnitReason::UnitFar)
    } else {
        (UNIT_VERY_FAR, UnitReason::UnitVeryFar)
    }
}

fn score_brand(item: &Item, product: &CandidateProduct) -> (f64, BrandReason) {
    let brand_norm = normalize(item.brand.as_deref().unwrap_or(""));
    if brand_norm.is_empty() {
        return (0.0, BrandReason::NoBrandHint);
    }

    let cand_name = normalize(&product.name);
    let cand_brand = normalize(product.brand.as_deref().unwrap_or(""));

    if cand_name.contains(&brand_norm) || cand_brand.contains(&brand_norm) {
        (BRAND_MATCH, BrandReason::BrandMatch)
    } else {
        (BRAND_MISMATCH, BrandReason::BrandMismatch)
    }
}

fn score_availability(product: &CandidateProduct) -> (f64, AvailabilityReason) {
    // Unknown availability must not penalize; only an explicit false does.
    if product.available == Some(false) {
        (NOT_AVAILABLE, AvailabilityReason::NotAvailable)
    } else {
        (0.0, AvailabilityReason::AvailableOrUnknown)
    }
}

fn score_bonus(product: &CandidateProduct, settings: &MatchSettings) -> (f64, BonusReason) {
    if !settings.prefer_bonus_tiebreak {
        return (0.0, BonusReason::BonusTiebreakDisabled);
    }
    if product.is_bonus {
        (BONUS_TIEBREAK, BonusReason::BonusTiebreak)
    } else {
        (0.0, BonusReason::NoBonus)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str) -> CandidateProduct {
        CandidateProduct {
            id: "p1".to_string(),
            name: name.to_string(),
            brand: None,
            unit_size: None,
            available: None,
            is_bonus: false,
        }
    }

    #[test]
    fn test_exact_name_match_overrides_partial_signals() {
        let item = Item::from_name("halfvolle melk");
        let scored = score_candidate(&item, &product("Halfvolle Melk"), &MatchSettings::default());

        let breakdown = scored.breakdown.unwrap();
        assert_eq!(breakdown.name, 100.0);
        assert!(breakdown.name_signals.exact);
        assert_eq!(scored.score, 100.0);
    }

    #[test]
    fn test_empty_query_name_scores_zero() {
        let item = Item::default();
        let scored = score_candidate(&item, &product("melk"), &MatchSettings::default());
        assert_eq!(scored.breakdown.unwrap().name, 0.0);
    }

    #[test]
    fn test_total_clamped_to_zero_for_all_negative_factors() {
        // Unavailable, wrong unit kind, wrong brand: every factor negative.
        let item = Item {
            name: Some("qqq".to_string()),
            brand: Some("merkx".to_string()),
            unit_hint: Some("500g".to_string()),
            ..Item::default()
        };
        let candidate = CandidateProduct {
            id: "p2".to_string(),
            name: "zzz 4 stuks".to_string(),
            brand: Some("ander".to_string()),
            unit_size: None,
            available: Some(false),
            is_bonus: false,
        };
        let scored = score_candidate(&item, &candidate, &MatchSettings::default());
        assert_eq!(scored.score, 0.0);

        let breakdown = scored.breakdown.unwrap();
        assert_eq!(breakdown.unit, UNIT_MISMATCH);
        assert_eq!(breakdown.brand, BRAND_MISMATCH);
        assert_eq!(breakdown.availability, NOT_AVAILABLE);
    }

    #[test]
    fn test_unit_deviation_ladder() {
        let settings = MatchSettings::default();
        let item = Item {
            name: Some("cola".to_string()),
            unit_hint: Some("1.5l".to_string()),
            ..Item::default()
        };

        let mut candidate = product("Cola Light");
        candidate.unit_size = Some("1500ml".to_string());
        let close = score_candidate(&item, &candidate, &settings);
        assert_eq!(close.breakdown.unwrap().unit, UNIT_CLOSE);

        candidate.unit_size = Some("1250ml".to_string());
        let reasonable = score_candidate(&item, &candidate, &settings);
        assert_eq!(reasonable.breakdown.unwrap().unit, UNIT_REASONABLE);

        candidate.unit_size = Some("330ml".to_string());
        let very_far = score_candidate(&item, &candidate, &settings);
        assert_eq!(very_far.breakdown.unwrap().unit, UNIT_VERY_FAR);
    }

    #[test]
    fn test_missing_query_hint_is_not_penalized() {
        let item = Item::from_name("bananen");
        let mut candidate = product("Bananen tros");
        candidate.unit_size = Some("1kg".to_string());
        let scored = score_candidate(&item, &candidate, &MatchSettings::default());

        let breakdown = scored.breakdown.unwrap();
        assert_eq!(breakdown.unit, 0.0);
        assert_eq!(breakdown.unit_reason, UnitReason::NoQueryUnitHint);
    }

    #[test]
    fn test_brand_substring_match() {
        let item = Item {
            name: Some("pindakaas".to_string()),
            brand: Some("Calvé".to_string()),
            ..Item::default()
        };
        let scored = score_candidate(
            &item,
            &product("Calve Pindakaas 350g"),
            &MatchSettings::default(),
        );
        assert_eq!(scored.breakdown.unwrap().brand, BRAND_MATCH);
    }

    #[test]
    fn test_bonus_tiebreak_respects_setting() {
        let item = Item::from_name("chips");
        let mut candidate = product("chips");
        candidate.is_bonus = true;

        let on = score_candidate(&item, &candidate, &MatchSettings::default());
        assert_eq!(on.breakdown.unwrap().bonus_tiebreak, BONUS_TIEBREAK);

        let settings = MatchSettings {
            prefer_bonus_tiebreak: false,
            ..MatchSettings::default()
        };
        let off = score_candidate(&item, &candidate, &settings);
        let breakdown = off.breakdown.unwrap();
        assert_eq!(breakdown.bonus_tiebreak, 0.0);
        assert_eq!(breakdown.bonus_reason, BonusReason::BonusTiebreakDisabled);
    }
}
