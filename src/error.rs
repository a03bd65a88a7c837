//! Error types for the retrieval pipeline.

use thiserror::Error;

use crate::index::Metric;

pub type Result<T> = std::result::Result<T, MemoryMapError>;

/// Errors raised by the embedder, the vector index, record validation and
/// pipeline assembly. The ranker never fails.
#[derive(Debug, Error)]
pub enum MemoryMapError {
    /// Query text that cannot be embedded (empty, whitespace, no tokens)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Vectors of differing dimensionality
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Index and ranker disagree on the distance metric
    #[error("Metric mismatch: index uses {index}, ranker expects {ranker}")]
    MetricMismatch { index: Metric, ranker: Metric },

    /// Index does not hold exactly one vector per record
    #[error("Index size mismatch: collection has {expected} records, index has {actual}")]
    IndexSize { expected: usize, actual: usize },

    /// Search against an index with no vectors
    #[error("No memories available: the index is empty")]
    EmptyIndex,

    /// Requested neighbour count outside 1..=size
    #[error("k out of range: {k} (index holds {size})")]
    KOutOfRange { k: usize, size: usize },

    /// Malformed memory record
    #[error("Record {record}: invalid {field}: {reason}")]
    RecordValidation {
        record: usize,
        field: &'static str,
        reason: String,
    },

    /// Embedding backend failure
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl MemoryMapError {
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn embedding<S: Into<String>>(msg: S) -> Self {
        Self::Embedding(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn record(record: usize, field: &'static str, reason: impl Into<String>) -> Self {
        Self::RecordValidation {
            record,
            field,
            reason: reason.into(),
        }
    }

    /// Errors the user can act on (fix the query, load data, fix a row),
    /// as opposed to wiring mistakes in the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::EmptyIndex | Self::RecordValidation { .. }
        )
    }
}
