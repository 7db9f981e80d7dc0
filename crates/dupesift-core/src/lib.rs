//! Dupesift — fuzzy duplicate detection for catalog records.
//!
//! Given a snapshot of catalog items (books, courses, content entries), the
//! engine finds groups that likely describe the same underlying work despite
//! inconsistent titles, author formatting or edition markers, and classifies
//! them by confidence for operator review. Pure computation: the caller
//! supplies the items, the engine returns a report, nothing is fetched or
//! persisted.

pub mod config;
pub mod error;
pub mod normalize;
pub mod phonetic;
pub mod pipeline;
pub mod report;
pub mod score;
pub mod series;
pub mod similarity;
pub mod types;

pub use config::{BucketingStrategy, DetectConfig, TitleMetricWeights};
pub use error::{DupesiftError, Result};
pub use pipeline::{CancelToken, detect_duplicates, detect_duplicates_cancellable};
pub use types::{
    CatalogItem, DetectionReport, DetectionStats, DuplicateCluster, ItemId, MetricScores,
    NormalizedItem, PairScore, SeriesToken, Tier, Warning, WarningReason,
};
