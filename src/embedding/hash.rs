//! Deterministic token-hashing embedding provider.
//!
//! Implements feature hashing over lowercased alphanumeric tokens: each token
//! hashes to a dimension and a sign, counts accumulate, and the result is
//! L2-normalized. Identical texts always embed identically and texts sharing
//! vocabulary land close in cosine space, which is exactly what the test
//! suite and offline runs need. It is not a semantic model.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::Result;

use super::{l2_normalize, EmbeddingProvider, EMBEDDING_DIM};

/// Offline embedding provider based on the hashing trick.
pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(EMBEDDING_DIM)
    }
}

impl EmbeddingProvider for HashEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let dim = (h as usize) % self.dimensions;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            v[dim] += sign;
        }

        // Tokenless input still gets a valid direction so downstream cosine
        // never sees a zero-norm vector from this provider.
        if v.iter().all(|x| *x == 0.0) {
            v[0] = 1.0;
        }

        l2_normalize(&mut v);
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
