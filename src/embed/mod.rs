pub mod hash;
pub mod ollama;

use crate::config::{EmbedBackend, EmbedConfig};
use crate::error::{MemoryMapError, Result};

pub use hash::HashEmbedder;
pub use ollama::OllamaEmbedder;

pub type Embedding = Vec<f32>;

/// Text to vector. Implementations are deterministic for a given instance
/// and return unit-length vectors of `dimensions()` entries.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Embedding>;
    /// Output order matches input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
    fn dimensions(&self) -> usize;
    fn model_name(&self) -> &str;
}

/// Construct the configured backend. The Ollama backend makes one probe
/// request here to learn its dimension.
pub fn build_embedder(config: &EmbedConfig) -> Result<Box<dyn Embedder>> {
    match &config.backend {
        EmbedBackend::Hash { dimensions } => Ok(Box::new(HashEmbedder::new(*dimensions)?)),
        EmbedBackend::Ollama { model, url } => Ok(Box::new(OllamaEmbedder::new(url, model)?)),
    }
}

/// Reject empty and whitespace-only text, returning the trimmed text.
pub fn validate_text(text: &str) -> Result<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MemoryMapError::invalid_input("text is empty"));
    }
    Ok(trimmed)
}

/// Scale to unit length in place. Returns false for the zero vector,
/// which is left untouched.
pub fn normalize(values: &mut [f32]) -> bool {
    let norm = values.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return false;
    }
    for v in values.iter_mut() {
        *v /= norm;
    }
    true
}
