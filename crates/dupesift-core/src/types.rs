use std::fmt;

use serde::{Deserialize, Serialize};

// ─── Identifiers ────────────────────────────────────────────

/// Opaque catalog-record identifier. The engine never interprets it beyond
/// equality and ordering (ordering gives pairs and clusters a stable layout).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ─── CatalogItem ────────────────────────────────────────────

/// A raw catalog record as supplied by the caller (spreadsheet import, manual
/// entry, migration). Immutable input; the engine never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Position of the record in its origin source. Assigned by the caller;
    /// used only as a deterministic tie-break when picking representatives.
    #[serde(default)]
    pub source_ref: u64,
}

impl CatalogItem {
    /// Create an item with the minimal required fields.
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: None,
            description: None,
            category: None,
            source_ref: 0,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_source_ref(mut self, source_ref: u64) -> Self {
        self.source_ref = source_ref;
        self
    }
}

// ─── NormalizedItem ─────────────────────────────────────────

/// A volume/edition marker recognized in a title ("book 2", "vol. iii", "#4").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesToken {
    /// The matched marker text, post-normalization.
    pub source: String,
    /// The position in the series the marker names.
    pub number: u32,
}

/// Canonicalized view of a [`CatalogItem`], owned by the pipeline for the
/// duration of one detection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub item_id: ItemId,
    /// Title after case folding, punctuation/diacritic stripping and noise
    /// removal. Series markers are kept here.
    pub title: String,
    /// Title with the series marker stripped; equals `title` when no marker
    /// was recognized.
    pub series_base: String,
    pub series_token: Option<SeriesToken>,
    /// Normalized author with name tokens sorted, so "Last, First" and
    /// "First Last" compare equal.
    pub author: Option<String>,
    pub category: Option<String>,
    /// Soundex code of the first significant title word. Bucketing only.
    pub phonetic_key: Option<String>,
    /// Soundex code of the second significant title word.
    pub second_phonetic_key: Option<String>,
    /// First significant title word, fallback bucketing key.
    pub first_word: String,
}

// ─── Pair scoring ───────────────────────────────────────────

/// The independent title metrics, each in [0, 1]. All four are always
/// computed so disagreement between them can be audited.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricScores {
    pub edit_distance: f64,
    pub jaro_winkler: f64,
    pub ngram: f64,
    pub phonetic: f64,
}

/// Confidence tier assigned to a scored pair or cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    NotDuplicate,
    Review,
    HighConfidence,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::NotDuplicate => "not-duplicate",
            Tier::Review => "review",
            Tier::HighConfidence => "high-confidence",
        };
        f.write_str(s)
    }
}

/// Score card for one unordered item pair. `a < b` by id, always.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairScore {
    pub a: ItemId,
    pub b: ItemId,
    pub metrics: MetricScores,
    pub author_score: f64,
    pub final_score: f64,
    pub tier: Tier,
    pub series_guard_triggered: bool,
}

// ─── Report ─────────────────────────────────────────────────

/// A connected component of pairs at or above the review threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCluster {
    /// Member ids, sorted. Always at least two.
    pub members: Vec<ItemId>,
    /// Suggested merge target: most complete description, then earliest
    /// `source_ref`, then smallest id.
    pub representative: ItemId,
    /// Weakest qualifying link inside the cluster.
    pub min_pairwise_score: f64,
    pub tier: Tier,
}

/// Why an item was excluded from comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningReason {
    MissingTitle,
    EmptyAfterNormalization,
}

impl fmt::Display for WarningReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WarningReason::MissingTitle => "missing title",
            WarningReason::EmptyAfterNormalization => "title empty after normalization",
        };
        f.write_str(s)
    }
}

/// Data-quality note about a skipped item. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub item_id: ItemId,
    pub reason: WarningReason,
}

/// Run counters for operator visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionStats {
    pub items_total: usize,
    pub items_skipped: usize,
    pub buckets: usize,
    pub pairs_scored: usize,
    pub pairs_linked: usize,
}

/// Output of one detection run. The engine owns no state beyond this value;
/// persistence and merge execution belong to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionReport {
    pub clusters: Vec<DuplicateCluster>,
    pub warnings: Vec<Warning>,
    /// True when the run was cancelled; clusters cover only the buckets
    /// merged before the cancellation point.
    pub partial: bool,
    pub stats: DetectionStats,
}
