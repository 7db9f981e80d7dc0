//! Blocking, pairwise scoring and transitive clustering.
//!
//! Items are bucketed so only likely-similar titles are ever compared.
//! Buckets are scored by parallel stateless workers; qualifying pairs are
//! merged into a union-find structure by a single sequential writer, so
//! cluster formation never races.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::{BucketingStrategy, DetectConfig};
use crate::error::{DupesiftError, Result};
use crate::normalize;
use crate::report;
use crate::score;
use crate::types::{
    CatalogItem, DetectionReport, DetectionStats, DuplicateCluster, ItemId, NormalizedItem, Tier,
    Warning,
};

/// Cooperative cancellation signal, checked between bucket batches. A
/// cancelled run returns the clusters committed so far with `partial: true`.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Run duplicate detection over a catalog snapshot. The single entry point:
/// no persisted state, no ambient configuration.
pub fn detect_duplicates(items: &[CatalogItem], config: &DetectConfig) -> Result<DetectionReport> {
    detect_duplicates_cancellable(items, config, &CancelToken::new())
}

pub fn detect_duplicates_cancellable(
    items: &[CatalogItem],
    config: &DetectConfig,
    cancel: &CancelToken,
) -> Result<DetectionReport> {
    config.validate()?;
    ensure_unique_ids(items)?;

    let mut warnings: Vec<Warning> = Vec::new();
    let mut normalized: Vec<NormalizedItem> = Vec::with_capacity(items.len());
    // normalized index → index into `items`
    let mut origin: Vec<usize> = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        match normalize::normalize_item(item) {
            Ok(n) => {
                normalized.push(n);
                origin.push(idx);
            }
            Err(warning) => {
                warn!(item_id = %warning.item_id, reason = %warning.reason, "skipping item");
                warnings.push(warning);
            }
        }
    }

    let buckets = build_buckets(&normalized, config.bucketing);
    let work = assign_pairs(&buckets);
    debug!(
        items = normalized.len(),
        buckets = buckets.len(),
        "bucketed catalog"
    );

    let mut dsu = UnionFind::new(normalized.len());
    // qualifying edges, kept for per-cluster minimum scores
    let mut edges: Vec<(usize, usize, f64)> = Vec::new();
    let mut pairs_scored = 0usize;
    let mut partial = false;

    let batch_size = rayon::current_num_threads().max(1) * 4;
    for batch in work.chunks(batch_size) {
        if cancel.is_cancelled() {
            debug!(edges_committed = edges.len(), "run cancelled");
            partial = true;
            break;
        }

        // Pure scoring fans out across workers; the union-find merge below
        // stays on this thread, whole batches at a time, so cancellation
        // never exposes a half-merged cluster.
        let scored: Vec<Vec<(usize, usize, Tier, f64)>> = batch
            .par_iter()
            .map(|pairs| {
                pairs
                    .iter()
                    .map(|&(i, j)| {
                        let s = score::score_pair(&normalized[i], &normalized[j], config);
                        (i, j, s.tier, s.final_score)
                    })
                    .collect()
            })
            .collect();

        for bucket_scores in scored {
            pairs_scored += bucket_scores.len();
            for (i, j, tier, final_score) in bucket_scores {
                if i == j {
                    return Err(DupesiftError::InvariantViolation(format!(
                        "self-pair for item {}",
                        normalized[i].item_id
                    )));
                }
                if tier >= Tier::Review {
                    dsu.union(i, j);
                    edges.push((i, j, final_score));
                }
            }
        }
    }

    let clusters = build_clusters(&mut dsu, &edges, &origin, items, &normalized, config);
    let stats = DetectionStats {
        items_total: items.len(),
        items_skipped: warnings.len(),
        buckets: buckets.len(),
        pairs_scored,
        pairs_linked: edges.len(),
    };
    Ok(report::assemble(clusters, warnings, stats, partial))
}

fn ensure_unique_ids(items: &[CatalogItem]) -> Result<()> {
    let mut seen: HashSet<&ItemId> = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(&item.id) {
            return Err(DupesiftError::DuplicateItemId(item.id.to_string()));
        }
    }
    Ok(())
}

/// Partition normalized items into comparison buckets. BTreeMaps keep bucket
/// order deterministic across runs.
fn build_buckets(normalized: &[NormalizedItem], strategy: BucketingStrategy) -> Vec<Vec<usize>> {
    let mut phonetic: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    let mut first_word: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

    for (idx, item) in normalized.iter().enumerate() {
        if matches!(
            strategy,
            BucketingStrategy::Phonetic | BucketingStrategy::Combined
        ) {
            // all-digit first words have no soundex code; fall back to the
            // word itself so those items still land somewhere
            let key = item.phonetic_key.as_deref().unwrap_or(&item.first_word);
            phonetic.entry(key).or_default().push(idx);
        }
        if matches!(
            strategy,
            BucketingStrategy::FirstWord | BucketingStrategy::Combined
        ) {
            first_word.entry(&item.first_word).or_default().push(idx);
        }
    }

    phonetic
        .into_values()
        .chain(first_word.into_values())
        .filter(|bucket| bucket.len() >= 2)
        .collect()
}

/// Assign every unordered in-bucket pair to exactly the first bucket that
/// contains it, so overlapping bucket families never score a pair twice.
fn assign_pairs(buckets: &[Vec<usize>]) -> Vec<Vec<(usize, usize)>> {
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut work = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let mut pairs = Vec::new();
        for (offset, &x) in bucket.iter().enumerate() {
            for &y in &bucket[offset + 1..] {
                let key = if x < y { (x, y) } else { (y, x) };
                if seen.insert(key) {
                    pairs.push(key);
                }
            }
        }
        work.push(pairs);
    }
    work
}

fn build_clusters(
    dsu: &mut UnionFind,
    edges: &[(usize, usize, f64)],
    origin: &[usize],
    items: &[CatalogItem],
    normalized: &[NormalizedItem],
    config: &DetectConfig,
) -> Vec<DuplicateCluster> {
    let mut member_sets: HashMap<usize, HashSet<usize>> = HashMap::new();
    let mut min_score: HashMap<usize, f64> = HashMap::new();
    for &(i, j, score) in edges {
        let root = dsu.find(i);
        member_sets.entry(root).or_default().extend([i, j]);
        min_score
            .entry(root)
            .and_modify(|current| *current = current.min(score))
            .or_insert(score);
    }

    let mut clusters = Vec::with_capacity(member_sets.len());
    for (root, member_set) in member_sets {
        if member_set.len() < 2 {
            continue;
        }
        let member_idxs: Vec<usize> = member_set.into_iter().collect();
        let representative = choose_representative(&member_idxs, origin, items);

        let mut members: Vec<ItemId> = member_idxs
            .iter()
            .map(|&m| normalized[m].item_id.clone())
            .collect();
        members.sort();

        let min_pairwise_score = min_score.get(&root).copied().unwrap_or(0.0);
        clusters.push(DuplicateCluster {
            members,
            representative,
            min_pairwise_score,
            tier: score::tier_for(min_pairwise_score, config),
        });
    }
    clusters
}

/// Deterministic merge target: most complete description, then earliest
/// source position, then smallest id.
fn choose_representative(member_idxs: &[usize], origin: &[usize], items: &[CatalogItem]) -> ItemId {
    let mut best = &items[origin[member_idxs[0]]];
    for &m in &member_idxs[1..] {
        let candidate = &items[origin[m]];
        let ordering = description_completeness(candidate)
            .cmp(&description_completeness(best))
            .then_with(|| best.source_ref.cmp(&candidate.source_ref))
            .then_with(|| best.id.cmp(&candidate.id));
        if ordering == std::cmp::Ordering::Greater {
            best = candidate;
        }
    }
    best.id.clone()
}

fn description_completeness(item: &CatalogItem) -> usize {
    item.description
        .as_deref()
        .map(|d| d.trim().len())
        .unwrap_or(0)
}

// ─── UnionFind ──────────────────────────────────────────────

/// Union-find over normalized-item indices, path halving + union by rank.
#[derive(Debug)]
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }
        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
    }
}
