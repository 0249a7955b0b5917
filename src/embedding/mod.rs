//! Text-to-vector embedding providers.
//!
//! The core treats embedding as an opaque `text -> fixed-length vector`
//! function behind the [`EmbeddingProvider`] trait. Two implementations ship:
//! a local ONNX Runtime provider (all-MiniLM-L6-v2) and an offline
//! deterministic token-hashing provider. Providers are selected through
//! configuration via [`create_provider`]; there is no implicit default model.

pub mod hash;
pub mod local;

use anyhow::Result;

/// Number of dimensions in the embedding space (all-MiniLM-L6-v2).
pub const EMBEDDING_DIM: usize = 384;

/// Trait for embedding text into vectors.
///
/// Implementations must be deterministic for identical input and produce
/// vectors of a fixed dimension per instance. All methods are synchronous —
/// callers in async contexts should use `tokio::task::spawn_blocking`, and
/// the stores never hold internal state locked across a provider call.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text string into a vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts. The default is a simple loop; implementations
    /// may override for fused inference.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Number of dimensions this provider produces.
    fn dimensions(&self) -> usize {
        EMBEDDING_DIM
    }
}

/// Create an embedding provider from config.
///
/// `"local"` requires model files — run `tandem model download` first.
/// `"hash"` needs nothing and works offline.
pub fn create_provider(
    config: &crate::config::EmbeddingConfig,
) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "local" => Ok(Box::new(local::LocalEmbeddingProvider::new(config)?)),
        "hash" => Ok(Box::new(hash::HashEmbeddingProvider::default())),
        other => anyhow::bail!("unknown embedding provider: {other}. Supported: local, hash"),
    }
}

/// L2-normalize a vector in place. A zero vector is left untouched.
pub(crate) fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn l2_normalize_produces_unit_norm() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
    }

    #[test]
    fn l2_normalize_leaves_zero_vector_alone() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = crate::config::EmbeddingConfig {
            provider: "remote".into(),
            ..Default::default()
        };
        assert!(create_provider(&config).is_err());
    }
}
