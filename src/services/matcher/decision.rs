//! Decision policy: rank scored candidates and classify the outcome into
//! a confidence tier using score and score-gap thresholds.

use log::debug;

use crate::services::matcher::scoring::round2;
use crate::services::matcher::types::{
    Confidence, MatchReason, MatchSettings, Resolution, ScoredCandidate,
};

/// Band below `auto_accept_score` that still rates medium confidence.
const NEAR_ACCEPT_BAND: f64 = 10.0;

/// Sort by score descending. The sort is stable, so ties keep encounter order.
fn sort_by_score(candidates: &mut [ScoredCandidate]) {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Rank candidates and classify the result.
///
/// Only `resolved == true` outcomes are eligible for caching and for any
/// downstream cart action; everything else is a first-class unresolved
/// outcome with a machine-readable reason.
pub fn decide(mut scored: Vec<ScoredCandidate>, settings: &MatchSettings) -> Resolution {
    if scored.is_empty() {
        return Resolution {
            resolved: false,
            confidence: Confidence::Low,
            score: 0.0,
            score_gap: 0.0,
            selected: None,
            alternatives: Vec::new(),
            reason: MatchReason::NoCandidates,
            from_cache: false,
        };
    }

    sort_by_score(&mut scored);
    let top_score = scored[0].score;
    let second_score = scored.get(1).map(|c| c.score).unwrap_or(0.0);
    let score_gap = round2(top_score - second_score);

    let (resolved, confidence, reason) = if top_score >= settings.auto_accept_score
        && score_gap >= settings.min_score_gap
    {
        (true, Confidence::High, MatchReason::HighConfidence)
    } else if top_score >= settings.auto_accept_score {
        (false, Confidence::Medium, MatchReason::ScoreGapTooSmall)
    } else if top_score >= settings.auto_accept_score - NEAR_ACCEPT_BAND {
        (false, Confidence::Medium, MatchReason::ScoreBelowAutoAccept)
    } else {
        (false, Confidence::Low, MatchReason::LowScore)
    };

    debug!(
        "decision: top={top_score:.2} gap={score_gap:.2} confidence={confidence} reason={reason}"
    );

    let mut alternatives = scored.split_off(1);
    alternatives.truncate(settings.max_alternatives);

    Resolution {
        resolved,
        confidence,
        score: top_score,
        score_gap,
        selected: scored.into_iter().next(),
        alternatives,
        reason,
        from_cache: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str, score: f64) -> ScoredCandidate {
        ScoredCandidate {
            id: id.to_string(),
            name: Some(id.to_string()),
            brand: None,
            unit_size: None,
            available: None,
            is_bonus: false,
            score,
            breakdown: None,
        }
    }

    fn decide_scores(scores: &[f64]) -> Resolution {
        let scored = scores
            .iter()
            .enumerate()
            .map(|(idx, score)| candidate(&format!("c{idx}"), *score))
            .collect();
        decide(scored, &MatchSettings::default())
    }

    #[test]
    fn test_zero_candidates() {
        let resolution = decide_scores(&[]);
        assert!(!resolution.resolved);
        assert_eq!(resolution.confidence, Confidence::Low);
        assert_eq!(resolution.reason, MatchReason::NoCandidates);
        assert!(resolution.selected.is_none());
        assert!(resolution.alternatives.is_empty());
    }

    #[test]
    fn test_single_strong_candidate_auto_accepts() {
        // Runner-up score defaults to 0, so the gap equals the top score.
        let resolution = decide_scores(&[80.0]);
        assert!(resolution.resolved);
        assert_eq!(resolution.confidence, Confidence::High);
        assert_eq!(resolution.reason, MatchReason::HighConfidence);
        assert_eq!(resolution.score_gap, 80.0);
    }

    #[test]
    fn test_small_gap_blocks_acceptance() {
        let resolution = decide_scores(&[80.0, 78.0]);
        assert!(!resolution.resolved);
        assert_eq!(resolution.confidence, Confidence::Medium);
        assert_eq!(resolution.reason, MatchReason::ScoreGapTooSmall);
        assert_eq!(resolution.score_gap, 2.0);
    }

    #[test]
    fn test_near_accept_band_is_medium() {
        let resolution = decide_scores(&[65.0, 10.0]);
        assert!(!resolution.resolved);
        assert_eq!(resolution.confidence, Confidence::Medium);
        assert_eq!(resolution.reason, MatchReason::ScoreBelowAutoAccept);
    }

    #[test]
    fn test_low_score() {
        let resolution = decide_scores(&[40.0, 10.0]);
        assert!(!resolution.resolved);
        assert_eq!(resolution.confidence, Confidence::Low);
        assert_eq!(resolution.reason, MatchReason::LowScore);
    }

    #[test]
    fn test_alternatives_capped_and_ordered() {
        let resolution = decide_scores(&[90.0, 50.0, 60.0, 40.0, 30.0, 20.0]);
        assert_eq!(resolution.selected.as_ref().unwrap().score, 90.0);
        let alt_scores: Vec<f64> = resolution.alternatives.iter().map(|c| c.score).collect();
        assert_eq!(alt_scores, vec![60.0, 50.0, 40.0]);
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let resolution = decide_scores(&[70.0, 70.0, 70.0]);
        assert_eq!(resolution.selected.as_ref().unwrap().id, "c0");
        assert_eq!(resolution.alternatives[0].id, "c1");
        assert_eq!(resolution.alternatives[1].id, "c2");
    }

    #[test]
    fn test_confidence_monotonic_in_top_score() {
        // Fixed comfortable gap; rising top score must never downgrade the tier.
        let mut last = Confidence::Low;
        for top in [10.0, 40.0, 62.0, 65.0, 72.0, 85.0, 100.0] {
            let resolution = decide_scores(&[top, top - 20.0]);
            assert!(
                resolution.confidence >= last,
                "confidence downgraded at top={top}"
            );
            last = resolution.confidence;
        }
    }

    #[test]
    fn test_shrinking_gap_never_upgrades() {
        let wide = decide_scores(&[80.0, 60.0]);
        let narrow = decide_scores(&[80.0, 79.0]);
        assert!(narrow.confidence <= wide.confidence);
        assert!(!narrow.resolved);
    }
}
