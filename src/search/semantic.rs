use serde::Serialize;
use tracing::{debug, info};

use super::rank::{Ranker, ScoredResult};
use crate::config::SearchConfig;
use crate::embed::Embedder;
use crate::error::{MemoryMapError, Result};
use crate::index::{Metric, Neighbor, VectorIndex};
use crate::store::Collection;

/// The query pipeline for one session: embed the query, search the index,
/// rank. Read-only once built, so a shared reference can serve queries
/// from several threads at once.
pub struct MemorySearch {
    collection: Collection,
    embedder: Box<dyn Embedder>,
    index: VectorIndex,
    ranker: Ranker,
    fingerprint: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    pub memories: usize,
    pub dimension: usize,
    pub model: String,
    pub metric: Metric,
    pub fingerprint: String,
}

impl MemorySearch {
    /// Embed every record once and build the index and ranker from
    /// `config`. Cost is one `embed_batch` over the whole collection.
    pub fn build(
        collection: Collection,
        embedder: Box<dyn Embedder>,
        config: &SearchConfig,
    ) -> Result<Self> {
        let ranker = Ranker::new(config.rank_config(), config.distance_metric)?;

        let texts: Vec<String> = collection
            .records()
            .iter()
            .map(|r| r.search_text())
            .collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let vectors = embedder.embed_batch(&refs)?;
        let index = VectorIndex::build(vectors, config.distance_metric)?;

        let search = Self::from_parts(collection, embedder, index, ranker)?;
        info!(
            memories = search.index.len(),
            dimension = search.index.dimension(),
            model = search.embedder.model_name(),
            metric = %search.index.metric(),
            fingerprint = &search.fingerprint[..12],
            "memory index ready"
        );
        Ok(search)
    }

    /// Assemble from separately built pieces, checking that they agree.
    pub fn from_parts(
        collection: Collection,
        embedder: Box<dyn Embedder>,
        index: VectorIndex,
        ranker: Ranker,
    ) -> Result<Self> {
        if index.len() != collection.len() {
            return Err(MemoryMapError::IndexSize {
                expected: collection.len(),
                actual: index.len(),
            });
        }
        if index.metric() != ranker.metric() {
            return Err(MemoryMapError::MetricMismatch {
                index: index.metric(),
                ranker: ranker.metric(),
            });
        }
        if !index.is_empty() && index.dimension() != embedder.dimensions() {
            return Err(MemoryMapError::DimensionMismatch {
                expected: index.dimension(),
                actual: embedder.dimensions(),
            });
        }
        let fingerprint = collection.fingerprint();
        Ok(Self {
            collection,
            embedder,
            index,
            ranker,
            fingerprint,
        })
    }

    /// Ranked memories for a natural-language query. An empty list means
    /// nothing cleared the similarity threshold; an empty collection is
    /// `EmptyIndex`.
    pub fn answer_query(&self, text: &str) -> Result<Vec<ScoredResult>> {
        let query = self.embedder.embed(text)?;
        let neighbors = self.index.search(&query, self.candidate_count())?;
        let results = self.ranker.rank(&neighbors);
        debug!(
            query = text,
            candidates = neighbors.len(),
            results = results.len(),
            "answered query"
        );
        Ok(results)
    }

    /// Nearest `k` records with raw distances, no thresholding.
    pub fn search_raw(&self, text: &str, k: usize) -> Result<Vec<Neighbor>> {
        let query = self.embedder.embed(text)?;
        self.index.search(&query, k)
    }

    fn candidate_count(&self) -> usize {
        let size = self.index.len();
        self.ranker
            .config()
            .max_results
            .map_or(size, |max| max.min(size))
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn ranker(&self) -> &Ranker {
        &self.ranker
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            memories: self.collection.len(),
            dimension: self.index.dimension(),
            model: self.embedder.model_name().to_string(),
            metric: self.index.metric(),
            fingerprint: self.fingerprint.clone(),
        }
    }
}

/// Short reason why a query has nothing to show, so callers can tell
/// "no data" from "no match" from "failed". `None` when there are results.
pub fn explain_empty(outcome: &Result<Vec<ScoredResult>>, query: &str) -> Option<String> {
    match outcome {
        Ok(results) if !results.is_empty() => None,
        Ok(_) => Some(format!("No closely matching memories found for '{query}'.")),
        Err(MemoryMapError::EmptyIndex) => {
            Some("No memories available. Add rows to the memories file first.".into())
        }
        Err(MemoryMapError::InvalidInput(reason)) => {
            Some(format!("Nothing to search for ({reason}). Try describing a place or moment."))
        }
        Err(e) => Some(format!("Search failed: {e}")),
    }
}
