//! Text normalization for item and product name comparison.
//! Handles transliteration, punctuation folding, and stopword-filtered
//! tokenization.

use deunicode::deunicode;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Compiled regex folding any run of non-alphanumerics to a single space.
static RE_NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("Invalid regex"));

/// Function words and unit filler words excluded from token comparison.
static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        "de", "het", "een", "en", "van", "voor", "met", "zonder", "per", "stuk", "stuks", "x",
    ])
});

/// Canonicalize free text for comparison.
///
/// Pipeline:
/// 1. Transliterate to ASCII via deunicode (diacritics dropped)
/// 2. Lowercase
/// 3. Replace runs of non-alphanumerics with a single space, trim
///
/// Idempotent; empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    let ascii = deunicode(text).to_lowercase();
    RE_NON_ALNUM.replace_all(&ascii, " ").trim().to_string()
}

/// Split canonical text into tokens, dropping stopwords.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|token| !token.is_empty() && !STOPWORDS.contains(*token))
        .map(|token| token.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_folds_case_and_punctuation() {
        assert_eq!(normalize("Coca-Cola  Zero!"), "coca cola zero");
        assert_eq!(normalize("melk (halfvol)"), "melk halfvol");
    }

    #[test]
    fn test_normalize_strips_diacritics() {
        assert_eq!(normalize("crème fraîche"), "creme fraiche");
        assert_eq!(normalize("jalapeño"), "jalapeno");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in ["  Bio-Appels 1kg ", "crème fraîche", "", "al genormaliseerd"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "normalize must be idempotent for {input:?}");
        }
    }

    #[test]
    fn test_normalize_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn test_tokenize_drops_stopwords() {
        assert_eq!(tokenize("melk van de boerderij"), vec!["melk", "boerderij"]);
        assert_eq!(tokenize("2 x kaas per stuk"), vec!["2", "kaas"]);
    }

    #[test]
    fn test_tokenize_empty_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("de het een").is_empty());
    }
}
