//! Local ONNX Runtime embedding provider.
//!
//! Runs all-MiniLM-L6-v2 through `ort`: tokenize, forward pass, mean pooling
//! over the attention mask, L2 normalization. Model files live in the
//! configured cache directory and are fetched by `tandem model download`.

use std::sync::Mutex;

use anyhow::{Context, Result};
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;

use super::{l2_normalize, EmbeddingProvider, EMBEDDING_DIM};
use crate::config::EmbeddingConfig;

/// Maximum sequence length for all-MiniLM-L6-v2.
const MAX_SEQ_LEN: usize = 256;

/// ONNX-backed embedding provider.
pub struct LocalEmbeddingProvider {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
}

// Safety: Tokenizer is Send+Sync. Session is only touched under the Mutex.
unsafe impl Send for LocalEmbeddingProvider {}
unsafe impl Sync for LocalEmbeddingProvider {}

impl LocalEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let cache_dir = crate::config::expand_tilde(&config.cache_dir);
        let model_path = cache_dir.join("model.onnx");
        let tokenizer_path = cache_dir.join("tokenizer.json");

        anyhow::ensure!(
            model_path.exists(),
            "ONNX model not found at {}. Run `tandem model download` first.",
            model_path.display()
        );
        anyhow::ensure!(
            tokenizer_path.exists(),
            "tokenizer not found at {}. Run `tandem model download` first.",
            tokenizer_path.display()
        );

        let session = Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(&model_path)
            .context("failed to load ONNX model")?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_SEQ_LEN,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("failed to set truncation: {e}"))?;
        tokenizer.with_padding(Some(tokenizers::PaddingParams {
            strategy: tokenizers::PaddingStrategy::BatchLongest,
            ..Default::default()
        }));

        tracing::info!(model = %model_path.display(), "local embedding model loaded");

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
        })
    }
}

impl EmbeddingProvider for LocalEmbeddingProvider {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut results = self.embed_batch(&[text])?;
        results
            .pop()
            .ok_or_else(|| anyhow::anyhow!("inference returned no output for single input"))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(texts.to_vec(), true)
            .map_err(|e| anyhow::anyhow!("tokenization failed: {e}"))?;

        let batch_size = encodings.len();
        let seq_len = encodings[0].get_ids().len();

        let mut input_ids = Vec::with_capacity(batch_size * seq_len);
        let mut attention_mask = Vec::with_capacity(batch_size * seq_len);
        for encoding in &encodings {
            input_ids.extend(encoding.get_ids().iter().map(|&id| id as i64));
            attention_mask.extend(encoding.get_attention_mask().iter().map(|&m| m as i64));
        }

        let shape = vec![batch_size as i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape.clone(), input_ids.into_boxed_slice()))?;
        let mask_tensor =
            Tensor::from_array((shape.clone(), attention_mask.clone().into_boxed_slice()))?;
        // Single-sentence inputs: token_type_ids are all zeros.
        let type_tensor =
            Tensor::from_array((shape, vec![0i64; batch_size * seq_len].into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow::anyhow!("session lock poisoned: {e}"))?;
        let outputs = session.run(ort::inputs! {
            "input_ids" => ids_tensor,
            "attention_mask" => mask_tensor,
            "token_type_ids" => type_tensor,
        })?;

        // Output naming varies by ONNX export; fall back to the first output.
        let hidden = outputs
            .get("token_embeddings")
            .or_else(|| outputs.get("last_hidden_state"))
            .unwrap_or_else(|| &outputs[0]);
        let (dims, data) = hidden
            .try_extract_tensor::<f32>()
            .context("failed to extract hidden-state tensor")?;

        let dims: &[i64] = &dims;
        anyhow::ensure!(
            dims.len() == 3 && dims[2] == EMBEDDING_DIM as i64,
            "unexpected hidden-state shape {dims:?}, expected [batch, seq, {EMBEDDING_DIM}]"
        );
        let out_seq_len = dims[1] as usize;

        let mut results = Vec::with_capacity(batch_size);
        for b in 0..batch_size {
            let mask = &attention_mask[b * seq_len..(b + 1) * seq_len];
            let tokens = &data[b * out_seq_len * EMBEDDING_DIM..(b + 1) * out_seq_len * EMBEDDING_DIM];
            results.push(mean_pool(tokens, mask, out_seq_len));
        }
        Ok(results)
    }
}

/// Mask-weighted mean over token embeddings, then L2 normalization.
fn mean_pool(tokens: &[f32], mask: &[i64], seq_len: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; EMBEDDING_DIM];
    let mut count = 0.0f32;

    for s in 0..seq_len {
        let weight = mask.get(s).copied().unwrap_or(0) as f32;
        if weight > 0.0 {
            let row = &tokens[s * EMBEDDING_DIM..(s + 1) * EMBEDDING_DIM];
            for (acc, x) in pooled.iter_mut().zip(row) {
                *acc += x * weight;
            }
            count += weight;
        }
    }

    if count > 0.0 {
        for x in &mut pooled {
            *x /= count;
        }
    }
    l2_normalize(&mut pooled);
    pooled
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_pool_ignores_masked_tokens() {
        // Two tokens, second masked out: pooling must return the first row.
        let mut tokens = vec![0.0f32; 2 * EMBEDDING_DIM];
        tokens[0] = 2.0;
        tokens[EMBEDDING_DIM] = 100.0;
        let pooled = mean_pool(&tokens, &[1, 0], 2);
        assert!((pooled[0] - 1.0).abs() < 1e-6);
    }

    fn offline_config() -> EmbeddingConfig {
        EmbeddingConfig::default()
    }

    #[test]
    #[ignore] // Requires model files — run with: cargo test -- --ignored
    fn embed_produces_unit_vectors_of_fixed_dim() {
        let provider = LocalEmbeddingProvider::new(&offline_config()).unwrap();
        let v = provider.embed("Hello world").unwrap();
        assert_eq!(v.len(), EMBEDDING_DIM);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    #[ignore]
    fn embed_is_deterministic() {
        let provider = LocalEmbeddingProvider::new(&offline_config()).unwrap();
        let a = provider.embed("Rust is a systems programming language").unwrap();
        let b = provider.embed("Rust is a systems programming language").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    #[ignore]
    fn similar_texts_score_higher_than_unrelated() {
        let provider = LocalEmbeddingProvider::new(&offline_config()).unwrap();
        let a = provider.embed("The cat sat on the mat").unwrap();
        let b = provider.embed("A cat was sitting on a mat").unwrap();
        let c = provider.embed("Quantum computing uses qubits").unwrap();

        let close = crate::vector::cosine_similarity(&a, &b).unwrap();
        let far = crate::vector::cosine_similarity(&a, &c).unwrap();
        assert!(close > far);
    }
}
