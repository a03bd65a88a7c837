//! Exact nearest-neighbour index over record embeddings.
//!
//! Brute force: every search scores the query against every stored vector.
//! At a few thousand records this is cheap and gives a fully deterministic
//! ordering, ties broken by ascending record index.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::embed::Embedding;
use crate::error::{MemoryMapError, Result};

/// Distance function, fixed when the index is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Euclidean distance.
    L2,
    /// `1 - dot(a, b)`: cosine distance for unit vectors.
    InnerProduct,
}

impl Metric {
    /// Smaller is closer for both metrics.
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::L2 => a
                .iter()
                .zip(b)
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f32>()
                .sqrt(),
            Metric::InnerProduct => 1.0 - a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::L2 => f.write_str("l2"),
            Metric::InnerProduct => f.write_str("inner_product"),
        }
    }
}

/// One search hit: position of the record in the collection and its
/// distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f32,
}

#[derive(Debug, Clone)]
pub struct VectorIndex {
    metric: Metric,
    dimension: usize,
    vectors: Vec<Embedding>,
}

impl VectorIndex {
    /// Take ownership of one vector per record, in record order. All
    /// vectors must share the first one's dimension. An empty input is
    /// allowed; searching it fails with `EmptyIndex`.
    pub fn build(vectors: Vec<Embedding>, metric: Metric) -> Result<Self> {
        let dimension = vectors.first().map_or(0, |v| v.len());
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(MemoryMapError::DimensionMismatch {
                expected: dimension,
                actual: bad.len(),
            });
        }
        debug!(vectors = vectors.len(), dimension, %metric, "built vector index");
        Ok(Self {
            metric,
            dimension,
            vectors,
        })
    }

    /// The `k` nearest records, closest first. Requires `1 <= k <= len()`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if self.vectors.is_empty() {
            return Err(MemoryMapError::EmptyIndex);
        }
        if k == 0 || k > self.vectors.len() {
            return Err(MemoryMapError::KOutOfRange {
                k,
                size: self.vectors.len(),
            });
        }
        if query.len() != self.dimension {
            return Err(MemoryMapError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(index, v)| Neighbor {
                index,
                distance: self.metric.distance(query, v),
            })
            .collect();

        // total_cmp puts NaN after every real distance
        neighbors.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.index.cmp(&b.index))
        });
        neighbors.truncate(k);
        Ok(neighbors)
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Zero for an empty index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(metric: Metric) -> VectorIndex {
        VectorIndex::build(
            vec![
                vec![1.0, 0.0],
                vec![0.0, 1.0],
                vec![0.6, 0.8],
                vec![1.0, 0.0],
            ],
            metric,
        )
        .unwrap()
    }

    #[test]
    fn l2_distance() {
        assert!((Metric::L2.distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn inner_product_distance() {
        assert!(Metric::InnerProduct.distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
        assert!((Metric::InnerProduct.distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((Metric::InnerProduct.distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn returns_exactly_k_ascending() {
        let index = sample(Metric::L2);
        let hits = index.search(&[0.0, 1.0], 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].index, 1);
        assert_eq!(hits[1].index, 2);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn ties_break_by_record_index() {
        for metric in [Metric::L2, Metric::InnerProduct] {
            let index = sample(metric);
            let hits = index.search(&[1.0, 0.0], 4).unwrap();
            assert_eq!(hits[0].index, 0);
            assert_eq!(hits[1].index, 3);
            assert_eq!(hits[0].distance, hits[1].distance);
        }
    }

    #[test]
    fn repeated_search_is_identical() {
        let index = sample(Metric::InnerProduct);
        let a = index.search(&[0.6, 0.8], 4).unwrap();
        let b = index.search(&[0.6, 0.8], 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn k_out_of_range() {
        let index = sample(Metric::L2);
        assert!(matches!(
            index.search(&[1.0, 0.0], 0),
            Err(MemoryMapError::KOutOfRange { k: 0, size: 4 })
        ));
        assert!(matches!(
            index.search(&[1.0, 0.0], 5),
            Err(MemoryMapError::KOutOfRange { k: 5, size: 4 })
        ));
    }

    #[test]
    fn empty_index_fails_before_range_check() {
        let index = VectorIndex::build(Vec::new(), Metric::L2).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.dimension(), 0);
        assert!(matches!(index.search(&[1.0], 0), Err(MemoryMapError::EmptyIndex)));
        assert!(matches!(index.search(&[1.0], 1), Err(MemoryMapError::EmptyIndex)));
    }

    #[test]
    fn build_rejects_mixed_dimensions() {
        let err = VectorIndex::build(vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]], Metric::L2).unwrap_err();
        assert!(matches!(
            err,
            MemoryMapError::DimensionMismatch { expected: 2, actual: 3 }
        ));
    }

    #[test]
    fn query_dimension_checked() {
        let index = sample(Metric::L2);
        assert!(matches!(
            index.search(&[1.0, 0.0, 0.0], 1),
            Err(MemoryMapError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }

    #[test]
    fn metric_serde_names() {
        assert_eq!(serde_json::to_string(&Metric::InnerProduct).unwrap(), "\"inner_product\"");
        let m: Metric = serde_json::from_str("\"l2\"").unwrap();
        assert_eq!(m, Metric::L2);
        assert_eq!(Metric::InnerProduct.to_string(), "inner_product");
    }
}
