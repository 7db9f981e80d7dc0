//! Combines the title metrics, author comparison and the series guard into
//! one confidence score and a discrete tier.

use crate::config::DetectConfig;
use crate::series;
use crate::similarity;
use crate::types::{NormalizedItem, PairScore, Tier};

/// Neutral author score when either side has no author. Absence of evidence
/// is not evidence of difference.
const AUTHOR_NEUTRAL: f64 = 0.5;

/// Score one candidate pair. Symmetric in its arguments; the returned pair
/// is always in canonical order (`a < b` by id).
pub fn score_pair(a: &NormalizedItem, b: &NormalizedItem, config: &DetectConfig) -> PairScore {
    let (a, b) = if a.item_id <= b.item_id { (a, b) } else { (b, a) };

    let metrics = similarity::title_metrics(a, b);
    let weights = &config.title_metric_weights;
    let title_score = (metrics.edit_distance * weights.edit_distance
        + metrics.jaro_winkler * weights.jaro_winkler
        + metrics.ngram * weights.ngram
        + metrics.phonetic * weights.phonetic)
        / weights.sum();

    let author_score = author_score(a, b);
    let category_match = match (&a.category, &b.category) {
        (Some(ca), Some(cb)) if ca == cb => 1.0,
        (None, None) => 1.0,
        _ => 0.0,
    };
    let exact_title = if a.title == b.title { 1.0 } else { 0.0 };

    let outer_sum = config.title_weight
        + config.author_weight
        + config.category_weight
        + config.exact_title_weight;
    let blended = (title_score * config.title_weight
        + author_score * config.author_weight
        + category_match * config.category_weight
        + exact_title * config.exact_title_weight)
        / outer_sum;

    // The guard always wins over the blend: near-identical bases with
    // differing volume markers are different entries, not duplicates.
    let series_guard_triggered = series::guard_triggered(a, b);
    let final_score = if series_guard_triggered {
        blended.min(config.series_guard_cap)
    } else {
        blended
    };

    PairScore {
        a: a.item_id.clone(),
        b: b.item_id.clone(),
        metrics,
        author_score,
        final_score,
        tier: tier_for(final_score, config),
        series_guard_triggered,
    }
}

fn author_score(a: &NormalizedItem, b: &NormalizedItem) -> f64 {
    match (&a.author, &b.author) {
        (Some(author_a), Some(author_b)) => {
            if author_a == author_b {
                1.0
            } else {
                similarity::edit_distance_ratio(author_a, author_b)
            }
        }
        _ => AUTHOR_NEUTRAL,
    }
}

pub fn tier_for(score: f64, config: &DetectConfig) -> Tier {
    if score >= config.high_confidence_threshold {
        Tier::HighConfidence
    } else if score >= config.review_threshold {
        Tier::Review
    } else {
        Tier::NotDuplicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_item;
    use crate::types::CatalogItem;

    fn norm(item: &CatalogItem) -> NormalizedItem {
        normalize_item(item).unwrap()
    }

    fn gatsby(id: &str) -> CatalogItem {
        CatalogItem::new(id, "The Great Gatsby").with_author("F. Scott Fitzgerald")
    }

    #[test]
    fn exact_duplicate_is_high_confidence() {
        let config = DetectConfig::default();
        let score = score_pair(&norm(&gatsby("a")), &norm(&gatsby("b")), &config);
        assert!(score.final_score >= 0.92);
        assert_eq!(score.tier, Tier::HighConfidence);
        assert!(!score.series_guard_triggered);
    }

    #[test]
    fn score_is_symmetric_and_canonically_ordered() {
        let config = DetectConfig::default();
        let x = norm(&CatalogItem::new("x", "The Pragmatic Programmer").with_author("Hunt"));
        let y = norm(&CatalogItem::new("y", "Pragmatic Programmer").with_author("Hunt & Thomas"));
        let xy = score_pair(&x, &y, &config);
        let yx = score_pair(&y, &x, &config);
        assert_eq!(xy, yx);
        assert!(xy.a < xy.b);
    }

    #[test]
    fn series_guard_caps_consecutive_volumes() {
        let config = DetectConfig::default();
        let a = norm(&CatalogItem::new("a", "Mystery Series Book 1"));
        let b = norm(&CatalogItem::new("b", "Mystery Series Book 2"));
        let score = score_pair(&a, &b, &config);

        // raw metrics see the titles as near-identical
        assert!(score.metrics.edit_distance > 0.9);
        assert!(score.series_guard_triggered);
        assert!(score.final_score <= 0.3);
        assert_eq!(score.tier, Tier::NotDuplicate);
    }

    #[test]
    fn missing_authors_are_neutral_not_penalized() {
        let config = DetectConfig::default();
        let with_authors = score_pair(&norm(&gatsby("a")), &norm(&gatsby("b")), &config);
        let without = score_pair(
            &norm(&CatalogItem::new("a", "The Great Gatsby")),
            &norm(&CatalogItem::new("b", "The Great Gatsby")),
            &config,
        );

        // no lower than the matching-author score minus the whole author
        // contribution
        let floor = with_authors.final_score - config.author_weight;
        assert!(without.final_score >= floor);
        assert!((without.author_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn differing_authors_use_fuzzy_similarity() {
        let config = DetectConfig::default();
        let a = norm(&CatalogItem::new("a", "Refactoring").with_author("Martin Fowler"));
        let b = norm(&CatalogItem::new("b", "Refactoring").with_author("Martin Fowlar"));
        let score = score_pair(&a, &b, &config);
        assert!(score.author_score > 0.8);
        assert!(score.author_score < 1.0);
    }

    #[test]
    fn category_mismatch_costs_its_weight() {
        let config = DetectConfig::default();
        let same = score_pair(
            &norm(&CatalogItem::new("a", "Dune").with_category("fiction")),
            &norm(&CatalogItem::new("b", "Dune").with_category("fiction")),
            &config,
        );
        let different = score_pair(
            &norm(&CatalogItem::new("a", "Dune").with_category("fiction")),
            &norm(&CatalogItem::new("b", "Dune").with_category("film")),
            &config,
        );
        let delta = same.final_score - different.final_score;
        assert!((delta - config.category_weight).abs() < 1e-9);
    }

    #[test]
    fn tier_thresholds_are_inclusive() {
        let config = DetectConfig::default();
        assert_eq!(tier_for(0.92, &config), Tier::HighConfidence);
        assert_eq!(tier_for(0.9199, &config), Tier::Review);
        assert_eq!(tier_for(0.75, &config), Tier::Review);
        assert_eq!(tier_for(0.7499, &config), Tier::NotDuplicate);
    }
}
