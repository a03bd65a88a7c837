use regex::Regex;

use super::{normalize, validate_text, Embedder, Embedding};
use crate::error::{MemoryMapError, Result};

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub const DEFAULT_DIMENSIONS: usize = 384;

/// Same character classes as `char::is_alphanumeric`.
const TOKEN_PATTERN: &str = r"[\p{Alphabetic}\p{N}]+";

/// Feature-hashing embedder. Each lower-cased word token is hashed with
/// FNV-1a and counted in one of `dimensions` buckets, and the count vector
/// is normalized to unit length. Counts never cancel, so any text with at
/// least one token embeds to a non-zero vector.
///
/// Needs no model download, so it is the default backend and the one the
/// test suite runs against. Only captures lexical overlap.
pub struct HashEmbedder {
    dimensions: usize,
    tokens: Regex,
    model: String,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(MemoryMapError::config("hash embedder needs at least one dimension"));
        }
        let tokens = Regex::new(TOKEN_PATTERN)
            .map_err(|e| MemoryMapError::config(format!("token pattern: {e}")))?;
        Ok(Self {
            dimensions,
            tokens,
            model: format!("fnv1a-hash-{dimensions}"),
        })
    }

    pub fn default() -> Result<Self> {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        let text = validate_text(text)?.to_lowercase();
        let mut values = vec![0.0f32; self.dimensions];

        for token in self.tokens.find_iter(&text) {
            let bucket = (fnv1a(token.as_str().as_bytes()) % self.dimensions as u64) as usize;
            values[bucket] += 1.0;
        }

        if !normalize(&mut values) {
            return Err(MemoryMapError::invalid_input(format!(
                "no searchable words in {text:?}"
            )));
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
