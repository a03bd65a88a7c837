//! Distance → similarity conversion, thresholding and highlighting.
//!
//! The similarity transform is strictly decreasing in distance for both
//! metrics, so ranking by descending score reproduces the index's
//! ascending-distance order, including the record-index tie-break.

use serde::Serialize;

use crate::error::{MemoryMapError, Result};
use crate::index::{Metric, Neighbor};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankConfig {
    pub similarity_threshold: f32,
    pub top_n: usize,
    /// None means no cap beyond the number of candidates.
    pub max_results: Option<usize>,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.3,
            top_n: 3,
            max_results: None,
        }
    }
}

impl RankConfig {
    pub fn validate(&self) -> Result<()> {
        let t = self.similarity_threshold;
        if !t.is_finite() || !(0.0..=1.0).contains(&t) {
            return Err(MemoryMapError::config(format!(
                "similarity_threshold must be within [0, 1], got {t}"
            )));
        }
        if self.top_n == 0 {
            return Err(MemoryMapError::config("top_n must be at least 1"));
        }
        if self.max_results == Some(0) {
            return Err(MemoryMapError::config("max_results must be at least 1"));
        }
        Ok(())
    }
}

/// One ranked memory. `record` indexes into the session's collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub record: usize,
    pub score: f32,
    /// Position in the result list, 0 = best
    pub rank: usize,
    pub highlighted: bool,
}

/// Map a distance to a similarity in [0, 1].
pub fn similarity(metric: Metric, distance: f32) -> f32 {
    match metric {
        Metric::L2 => 1.0 / (1.0 + distance),
        // distance = 1 - cos, so this is (1 + cos) / 2
        Metric::InnerProduct => (1.0 - distance / 2.0).clamp(0.0, 1.0),
    }
}

#[derive(Debug, Clone)]
pub struct Ranker {
    config: RankConfig,
    metric: Metric,
}

impl Ranker {
    pub fn new(config: RankConfig, metric: Metric) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, metric })
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Score, filter, order, cap and highlight. Never fails: an empty
    /// output means nothing cleared the threshold.
    pub fn rank(&self, candidates: &[Neighbor]) -> Vec<ScoredResult> {
        let mut scored: Vec<(usize, f32)> = candidates
            .iter()
            .map(|n| (n.index, similarity(self.metric, n.distance)))
            .filter(|(_, score)| *score >= self.config.similarity_threshold)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        if let Some(max) = self.config.max_results {
            scored.truncate(max);
        }

        let highlighted = self.config.top_n.min(scored.len());
        scored
            .into_iter()
            .enumerate()
            .map(|(rank, (record, score))| ScoredResult {
                record,
                score,
                rank,
                highlighted: rank < highlighted,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(index: usize, distance: f32) -> Neighbor {
        Neighbor { index, distance }
    }

    fn ranker(threshold: f32, top_n: usize, max_results: Option<usize>) -> Ranker {
        Ranker::new(
            RankConfig {
                similarity_threshold: threshold,
                top_n,
                max_results,
            },
            Metric::L2,
        )
        .unwrap()
    }

    #[test]
    fn l2_similarity() {
        assert_eq!(similarity(Metric::L2, 0.0), 1.0);
        assert_eq!(similarity(Metric::L2, 1.0), 0.5);
        assert!(similarity(Metric::L2, 3.0) < similarity(Metric::L2, 2.0));
    }

    #[test]
    fn inner_product_similarity() {
        assert_eq!(similarity(Metric::InnerProduct, 0.0), 1.0);
        assert_eq!(similarity(Metric::InnerProduct, 1.0), 0.5);
        assert_eq!(similarity(Metric::InnerProduct, 2.0), 0.0);
        // rounding just past the ends stays in range
        assert_eq!(similarity(Metric::InnerProduct, -1e-7), 1.0);
        assert_eq!(similarity(Metric::InnerProduct, 2.0 + 1e-6), 0.0);
    }

    #[test]
    fn transform_preserves_distance_order() {
        for metric in [Metric::L2, Metric::InnerProduct] {
            let distances = [0.0f32, 0.1, 0.5, 0.9, 1.3, 1.99];
            for w in distances.windows(2) {
                assert!(similarity(metric, w[0]) > similarity(metric, w[1]));
            }
        }
    }

    #[test]
    fn sorts_descending_with_index_tie_break() {
        let r = ranker(0.0, 1, None);
        let out = r.rank(&[n(4, 1.0), n(2, 0.5), n(1, 1.0), n(0, 3.0)]);
        let order: Vec<usize> = out.iter().map(|s| s.record).collect();
        assert_eq!(order, vec![2, 1, 4, 0]);
        assert_eq!(out.iter().map(|s| s.rank).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn threshold_drops_low_scores() {
        // scores: 1.0, 0.5, 0.25
        let r = ranker(0.5, 3, None);
        let out = r.rank(&[n(0, 0.0), n(1, 1.0), n(2, 3.0)]);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|s| s.score >= 0.5));
    }

    #[test]
    fn nothing_survives_is_empty_not_error() {
        let r = ranker(0.99, 3, None);
        assert!(r.rank(&[n(0, 0.5), n(1, 1.0)]).is_empty());
        assert!(r.rank(&[]).is_empty());
    }

    #[test]
    fn max_results_caps_output() {
        let r = ranker(0.0, 3, Some(2));
        let out = r.rank(&[n(0, 0.1), n(1, 0.2), n(2, 0.3)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].record, 1);
    }

    #[test]
    fn highlight_first_top_n() {
        let r = ranker(0.0, 2, None);
        let out = r.rank(&[n(0, 0.1), n(1, 0.2), n(2, 0.3), n(3, 0.4)]);
        let flags: Vec<bool> = out.iter().map(|s| s.highlighted).collect();
        assert_eq!(flags, vec![true, true, false, false]);
    }

    #[test]
    fn top_n_larger_than_results_highlights_all() {
        let r = ranker(0.0, 10, None);
        let out = r.rank(&[n(0, 0.1), n(1, 0.2)]);
        assert!(out.iter().all(|s| s.highlighted));
    }

    #[test]
    fn config_validation() {
        let bad = [
            RankConfig { similarity_threshold: -0.1, ..RankConfig::default() },
            RankConfig { similarity_threshold: 1.1, ..RankConfig::default() },
            RankConfig { similarity_threshold: f32::NAN, ..RankConfig::default() },
            RankConfig { top_n: 0, ..RankConfig::default() },
            RankConfig { max_results: Some(0), ..RankConfig::default() },
        ];
        for config in bad {
            assert!(matches!(
                Ranker::new(config, Metric::L2),
                Err(MemoryMapError::Config(_))
            ));
        }
        assert!(Ranker::new(RankConfig::default(), Metric::InnerProduct).is_ok());
    }
}
