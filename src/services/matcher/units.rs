//! Unit and quantity extraction from free-text size hints.
//!
//! Recognizes multipack notation ("2x500ml") and simple amounts ("1.5l"),
//! converting everything to canonical base units (g, ml, count).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Multipack notation: count, amount, unit.
static RE_MULTIPACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*x\s*(\d+(?:[.,]\d+)?)\s*(kg|g|l|ml|cl)\b").expect("Invalid regex")
});

/// Simple amount with unit. Longer spellings listed first so the
/// alternation prefers them over their prefixes.
static RE_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:[.,]\d+)?)\s*(kg|grams|gram|g|liter|litre|l|ml|cl|stuks|stuk|x)\b")
        .expect("Invalid regex")
});

/// Canonical base unit for size comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CanonicalUnit {
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "ml")]
    Milliliters,
    #[serde(rename = "count")]
    Count,
}

impl std::fmt::Display for CanonicalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanonicalUnit::Grams => write!(f, "g"),
            CanonicalUnit::Milliliters => write!(f, "ml"),
            CanonicalUnit::Count => write!(f, "count"),
        }
    }
}

/// A parsed size hint in canonical units. Computed on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitHint {
    pub value: f64,
    pub unit: CanonicalUnit,
    /// The matched fragment of the source text.
    pub raw: String,
}

/// Parse a size hint from a single text source.
///
/// The text is lowercased but otherwise untouched: decimal separators must
/// survive, so the punctuation-folding normalizer is not applied here.
/// Returns `None` when neither pattern matches; absence is a common,
/// valid outcome.
pub fn parse_unit_hint(text: &str) -> Option<UnitHint> {
    let text = text.to_lowercase();

    if let Some(caps) = RE_MULTIPACK.captures(&text) {
        let count = parse_amount(&caps[1])?;
        let amount = parse_amount(&caps[2])?;
        let (amount, unit) = convert(amount, &caps[3]);
        return Some(UnitHint {
            value: count * amount,
            unit,
            raw: caps[0].to_string(),
        });
    }

    let caps = RE_UNIT.captures(&text)?;
    let amount = parse_amount(&caps[1])?;
    let (value, unit) = convert(amount, &caps[2]);
    Some(UnitHint {
        value,
        unit,
        raw: caps[0].to_string(),
    })
}

/// Try each text source in order, returning the first parseable hint.
pub fn extract_unit_hint(sources: &[Option<&str>]) -> Option<UnitHint> {
    sources.iter().flatten().find_map(|source| parse_unit_hint(source))
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', ".").parse().ok()
}

fn convert(amount: f64, unit: &str) -> (f64, CanonicalUnit) {
    match unit {
        "kg" => (amount * 1000.0, CanonicalUnit::Grams),
        "g" | "gram" | "grams" => (amount, CanonicalUnit::Grams),
        "l" | "liter" | "litre" => (amount * 1000.0, CanonicalUnit::Milliliters),
        "cl" => (amount * 10.0, CanonicalUnit::Milliliters),
        "ml" => (amount, CanonicalUnit::Milliliters),
        _ => (amount, CanonicalUnit::Count),
    }
}
