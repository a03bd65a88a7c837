use serde::Deserialize;
use tracing::debug;

use super::{normalize, validate_text, Embedder, Embedding};
use crate::error::{MemoryMapError, Result};

const MAX_PROMPT_BYTES: usize = 8192;

/// Embedder backed by a local Ollama server.
///
/// Construction sends one probe request to learn the model's dimension,
/// so it fails fast when the server or model is unavailable.
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let mut embedder = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions: 0,
        };

        let probe = embedder.request("test")?;
        if probe.is_empty() {
            return Err(MemoryMapError::embedding(format!(
                "ollama model {model} returned an empty embedding"
            )));
        }
        embedder.dimensions = probe.len();
        debug!(model, dimensions = embedder.dimensions, "ollama embedder ready");
        Ok(embedder)
    }

    pub fn default() -> Result<Self> {
        Self::new("http://localhost:11434", "nomic-embed-text")
    }

    fn request(&self, text: &str) -> Result<Embedding> {
        let url = format!("{}/api/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "prompt": truncate(text, MAX_PROMPT_BYTES),
        });

        let mut response = match ureq::post(&url).send_json(&body) {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(code)) => {
                return Err(MemoryMapError::embedding(format!("ollama returned HTTP {code}")));
            }
            Err(e) => {
                return Err(MemoryMapError::embedding(format!(
                    "ollama embedding request failed: {e}"
                )));
            }
        };

        let resp: EmbeddingResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| MemoryMapError::embedding(format!("parsing ollama response: {e}")))?;

        Ok(resp.embedding)
    }
}

/// Cut at the last char boundary at or below `max` bytes.
fn truncate(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        let text = validate_text(text)?;
        let mut values = self.request(text)?;

        if values.len() != self.dimensions {
            return Err(MemoryMapError::DimensionMismatch {
                expected: self.dimensions,
                actual: values.len(),
            });
        }
        if !normalize(&mut values) {
            return Err(MemoryMapError::embedding("ollama returned a zero vector"));
        }
        Ok(values)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_text_untouched() {
        assert_eq!(truncate("sunset", 8192), "sunset");
    }

    #[test]
    fn truncate_respects_char_boundary() {
        // 'é' is two bytes; cutting at 3 would split the second one
        let text = "éé";
        assert_eq!(truncate(text, 3), "é");
        assert_eq!(truncate(text, 4), "éé");
    }

    #[test]
    fn unreachable_server_is_embedding_error() {
        let err = OllamaEmbedder::new("http://127.0.0.1:9", "nomic-embed-text").err().unwrap();
        assert!(matches!(err, MemoryMapError::Embedding(_)));
    }
}
