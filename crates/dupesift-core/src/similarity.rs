//! Pure, deterministic string metrics, each bounded in [0, 1]. Degenerate
//! input (an empty side) scores 0; a comparison never fails.

use std::collections::HashSet;

use crate::types::{MetricScores, NormalizedItem};

/// Normalized Levenshtein: `1 − distance / max(len)`. 1.0 for identical
/// non-empty strings.
pub fn edit_distance_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b)
}

/// Jaro similarity with the standard Winkler prefix boost (prefix capped at
/// 4 characters, scaling factor 0.1). Truncated and abbreviated titles share
/// prefixes far more than suffixes, which this rewards.
pub fn jaro_winkler(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::jaro_winkler(a, b)
}

/// Jaccard overlap of character 2-grams and 3-grams, averaged. Robust to
/// word reordering and minor insertions.
pub fn ngram_jaccard(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    (gram_jaccard(a, b, 2) + gram_jaccard(a, b, 3)) / 2.0
}

fn gram_jaccard(a: &str, b: &str, n: usize) -> f64 {
    let grams_a = grams(a, n);
    let grams_b = grams(b, n);
    let intersection = grams_a.intersection(&grams_b).count();
    let union = grams_a.union(&grams_b).count();
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

fn grams(s: &str, n: usize) -> HashSet<Vec<char>> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < n {
        // Shorter than one gram: the whole string is the only gram, so
        // short titles still compare instead of degenerating to empty sets.
        return HashSet::from([chars]);
    }
    chars.windows(n).map(|w| w.to_vec()).collect()
}

/// Agreement of the Soundex keys of the first two significant title words:
/// both match → 1.0, one matches → 0.5, none → 0.0. A weak signal, weighted
/// accordingly by the scorer.
pub fn phonetic_agreement(a: &NormalizedItem, b: &NormalizedItem) -> f64 {
    let first = keys_match(&a.phonetic_key, &b.phonetic_key);
    let second = keys_match(&a.second_phonetic_key, &b.second_phonetic_key);

    match (first, second) {
        (Some(true), Some(true)) => 1.0,
        // Single-word titles have no second key; a first-key match is then
        // full agreement on everything there is to compare.
        (Some(true), None) => 1.0,
        (Some(true), Some(false)) | (Some(false) | None, Some(true)) => 0.5,
        _ => 0.0,
    }
}

/// `Some(equal)` when both keys are present, `None` when both are absent.
fn keys_match(a: &Option<String>, b: &Option<String>) -> Option<bool> {
    match (a, b) {
        (Some(ka), Some(kb)) => Some(ka == kb),
        (None, None) => None,
        _ => Some(false),
    }
}

/// Compute all four title metrics. Every metric is evaluated even when one
/// saturates, so tests and operators can audit disagreement between them.
pub fn title_metrics(a: &NormalizedItem, b: &NormalizedItem) -> MetricScores {
    MetricScores {
        edit_distance: edit_distance_ratio(&a.title, &b.title),
        jaro_winkler: jaro_winkler(&a.title, &b.title),
        ngram: ngram_jaccard(&a.title, &b.title),
        phonetic: phonetic_agreement(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_item;
    use crate::types::CatalogItem;

    fn norm(title: &str) -> NormalizedItem {
        normalize_item(&CatalogItem::new("t", title)).unwrap()
    }

    #[test]
    fn identical_strings_saturate_character_metrics() {
        assert_eq!(edit_distance_ratio("the great gatsby", "the great gatsby"), 1.0);
        assert_eq!(jaro_winkler("the great gatsby", "the great gatsby"), 1.0);
        assert_eq!(ngram_jaccard("the great gatsby", "the great gatsby"), 1.0);
    }

    #[test]
    fn empty_input_scores_zero_everywhere() {
        let metrics: [fn(&str, &str) -> f64; 3] =
            [edit_distance_ratio, jaro_winkler, ngram_jaccard];
        for metric in metrics {
            assert_eq!(metric("", "gatsby"), 0.0);
            assert_eq!(metric("gatsby", ""), 0.0);
            assert_eq!(metric("", ""), 0.0);
        }
    }

    #[test]
    fn edit_ratio_reflects_distance() {
        // one substitution over ten characters
        let score = edit_distance_ratio("understand", "understond");
        assert!((score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn jaro_winkler_rewards_shared_prefix() {
        let with_prefix = jaro_winkler("introduction to rust", "introduction to go");
        let without = jaro_winkler("rust introduction", "go introduction");
        assert!(with_prefix > without);
    }

    #[test]
    fn ngram_survives_word_reordering() {
        let reordered = ngram_jaccard("algorithms and data structures", "data structures and algorithms");
        let unrelated = ngram_jaccard("algorithms and data structures", "cooking for beginners");
        assert!(reordered > 0.7);
        assert!(unrelated < 0.2);
    }

    #[test]
    fn metrics_are_symmetric() {
        let pairs = [
            ("the hobbit", "the hobit"),
            ("calculus made easy", "easy calculus"),
            ("a", "ab"),
        ];
        for (x, y) in pairs {
            assert_eq!(edit_distance_ratio(x, y), edit_distance_ratio(y, x));
            assert_eq!(jaro_winkler(x, y), jaro_winkler(y, x));
            assert_eq!(ngram_jaccard(x, y), ngram_jaccard(y, x));
        }
    }

    #[test]
    fn phonetic_agreement_tiers() {
        assert_eq!(phonetic_agreement(&norm("great gatsby"), &norm("grate gatsbee")), 1.0);
        assert_eq!(phonetic_agreement(&norm("great gatsby"), &norm("great expectations")), 0.5);
        assert_eq!(phonetic_agreement(&norm("war and peace"), &norm("crime and punishment")), 0.0);
    }

    #[test]
    fn phonetic_agreement_single_word_titles() {
        assert_eq!(phonetic_agreement(&norm("dune"), &norm("doone")), 1.0);
        assert_eq!(phonetic_agreement(&norm("dune"), &norm("emma")), 0.0);
    }

    #[test]
    fn all_metrics_computed_even_when_one_saturates() {
        let a = norm("the great gatsby");
        let b = norm("the great gatsby");
        let m = title_metrics(&a, &b);
        assert_eq!(m.edit_distance, 1.0);
        assert_eq!(m.jaro_winkler, 1.0);
        assert_eq!(m.ngram, 1.0);
        assert_eq!(m.phonetic, 1.0);
    }
}
