//! Report assembly for the external review/merge tooling.

use crate::error::Result;
use crate::types::{DetectionReport, DetectionStats, DuplicateCluster, Warning};

/// Assemble the final report. Clusters are sorted by representative id so
/// repeated runs over the same catalog emit byte-identical output.
pub fn assemble(
    mut clusters: Vec<DuplicateCluster>,
    warnings: Vec<Warning>,
    stats: DetectionStats,
    partial: bool,
) -> DetectionReport {
    clusters.sort_by(|a, b| a.representative.cmp(&b.representative));
    DetectionReport {
        clusters,
        warnings,
        partial,
        stats,
    }
}

/// Serialize a report as pretty-printed JSON.
pub fn to_json(report: &DetectionReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ItemId, Tier};

    fn cluster(representative: &str, members: &[&str]) -> DuplicateCluster {
        DuplicateCluster {
            members: members.iter().map(|m| ItemId::from(*m)).collect(),
            representative: ItemId::from(representative),
            min_pairwise_score: 0.8,
            tier: Tier::Review,
        }
    }

    #[test]
    fn clusters_sorted_by_representative() {
        let report = assemble(
            vec![cluster("z9", &["z9", "z10"]), cluster("a1", &["a1", "a2"])],
            vec![],
            DetectionStats::default(),
            false,
        );
        assert_eq!(report.clusters[0].representative.as_str(), "a1");
        assert_eq!(report.clusters[1].representative.as_str(), "z9");
    }

    #[test]
    fn json_round_trips() {
        let report = assemble(
            vec![cluster("a1", &["a1", "a2"])],
            vec![],
            DetectionStats {
                items_total: 2,
                ..Default::default()
            },
            false,
        );
        let json = to_json(&report).unwrap();
        let parsed: DetectionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
