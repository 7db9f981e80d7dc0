use serde::{Deserialize, Serialize};

use crate::error::{DupesiftError, Result};

/// Relative weights for the four title metrics. Blended as a weighted
/// average, so only the ratios matter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleMetricWeights {
    pub edit_distance: f64,
    pub jaro_winkler: f64,
    pub ngram: f64,
    pub phonetic: f64,
}

impl Default for TitleMetricWeights {
    fn default() -> Self {
        // Character-level metrics dominate; n-gram and phonetic are coarser
        // corroborating signals.
        Self {
            edit_distance: 0.35,
            jaro_winkler: 0.35,
            ngram: 0.2,
            phonetic: 0.1,
        }
    }
}

impl TitleMetricWeights {
    pub fn sum(&self) -> f64 {
        self.edit_distance + self.jaro_winkler + self.ngram + self.phonetic
    }
}

/// How items are partitioned into comparison buckets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BucketingStrategy {
    /// Soundex code of the first significant title word.
    Phonetic,
    /// First significant title word, verbatim.
    FirstWord,
    /// Union of both bucket families; each unordered pair still scored once.
    #[default]
    Combined,
}

/// Tunable knobs for one detection run. The defaults are a starting
/// calibration, not verified constants; operators are expected to tune them
/// against a labeled sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectConfig {
    pub title_metric_weights: TitleMetricWeights,

    /// Weight of the blended title score in the final score.
    pub title_weight: f64,
    pub author_weight: f64,
    pub category_weight: f64,
    /// Weight of the byte-identical-title bonus.
    pub exact_title_weight: f64,

    pub high_confidence_threshold: f64,
    pub review_threshold: f64,

    /// Ceiling applied to the final score when the series guard fires.
    pub series_guard_cap: f64,

    pub bucketing: BucketingStrategy,
}

impl Default for DetectConfig {
    fn default() -> Self {
        Self {
            title_metric_weights: TitleMetricWeights::default(),
            title_weight: 0.6,
            author_weight: 0.25,
            category_weight: 0.05,
            exact_title_weight: 0.10,
            high_confidence_threshold: 0.92,
            review_threshold: 0.75,
            series_guard_cap: 0.3,
            bucketing: BucketingStrategy::Combined,
        }
    }
}

impl DetectConfig {
    /// Reject configurations that would skew every score. Called at the top
    /// of a run so a bad operator config fails fast.
    pub fn validate(&self) -> Result<()> {
        let w = &self.title_metric_weights;
        for (name, value) in [
            ("title_metric_weights.edit_distance", w.edit_distance),
            ("title_metric_weights.jaro_winkler", w.jaro_winkler),
            ("title_metric_weights.ngram", w.ngram),
            ("title_metric_weights.phonetic", w.phonetic),
            ("title_weight", self.title_weight),
            ("author_weight", self.author_weight),
            ("category_weight", self.category_weight),
            ("exact_title_weight", self.exact_title_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DupesiftError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if w.sum() <= 0.0 {
            return Err(DupesiftError::InvalidConfig(
                "title metric weights must not all be zero".to_string(),
            ));
        }
        let outer = self.title_weight
            + self.author_weight
            + self.category_weight
            + self.exact_title_weight;
        if outer <= 0.0 {
            return Err(DupesiftError::InvalidConfig(
                "score weights must not all be zero".to_string(),
            ));
        }

        for (name, value) in [
            ("high_confidence_threshold", self.high_confidence_threshold),
            ("review_threshold", self.review_threshold),
            ("series_guard_cap", self.series_guard_cap),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(DupesiftError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.review_threshold > self.high_confidence_threshold {
            return Err(DupesiftError::InvalidConfig(format!(
                "review_threshold ({}) must not exceed high_confidence_threshold ({})",
                self.review_threshold, self.high_confidence_threshold
            )));
        }

        Ok(())
    }
}
