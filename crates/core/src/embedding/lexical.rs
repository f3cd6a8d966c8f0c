//! Hashing-based lexical embedder.
//!
//! Stand-in for a multi-functionality embedding model: sparse weights come from
//! term frequencies over hashed token IDs, the dense vector from signed feature
//! hashing of tokens and their character trigrams. Deterministic across runs
//! and platforms, so a corpus indexed once can be queried later.

use super::tokenizer::tokenize;
use super::{Embedder, EmbeddingOutput};
use crate::config::{DEFAULT_DENSE_DIMS, DEFAULT_SPARSE_DIMS, MAX_DENSE_DIMS};
use crate::error::{Error, Result};
use std::collections::HashMap;
use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

/// Seed separating dense feature buckets from sparse token IDs.
const DENSE_SEED: u64 = 0x6879_6272_6964;

/// Weight of each `#token#` trigram relative to the whole token.
const TRIGRAM_WEIGHT: f32 = 0.5;

/// Deterministic, model-free [`Embedder`].
#[derive(Debug, Clone)]
pub struct LexicalEmbedder {
    dense_dims: usize,
    sparse_dims: u32,
}

impl LexicalEmbedder {
    /// Creates an embedder producing `dense_dims`-wide dense vectors over a
    /// `sparse_dims` token vocabulary.
    pub fn new(dense_dims: usize, sparse_dims: u32) -> Result<Self> {
        if dense_dims == 0 || dense_dims > MAX_DENSE_DIMS {
            return Err(Error::Embedding(format!(
                "dense dimension must be in 1..={}, got {}",
                MAX_DENSE_DIMS, dense_dims
            )));
        }
        if sparse_dims == 0 {
            return Err(Error::Embedding("sparse vocabulary size must be positive".into()));
        }
        Ok(Self {
            dense_dims,
            sparse_dims,
        })
    }

    /// Token ID of `token` in this embedder's vocabulary.
    pub fn token_id(&self, token: &str) -> u32 {
        (xxh3_64(token.as_bytes()) % self.sparse_dims as u64) as u32
    }

    fn hash_feature(&self, feature: &[u8], weight: f32, dense: &mut [f32]) {
        let h = xxh3_64_with_seed(feature, DENSE_SEED);
        let bucket = (h % self.dense_dims as u64) as usize;
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        dense[bucket] += sign * weight;
    }
}

impl Default for LexicalEmbedder {
    fn default() -> Self {
        Self {
            dense_dims: DEFAULT_DENSE_DIMS,
            sparse_dims: DEFAULT_SPARSE_DIMS,
        }
    }
}

impl Embedder for LexicalEmbedder {
    fn embed(&self, text: &str) -> Result<EmbeddingOutput> {
        let tokens = tokenize(text);
        let mut dense = vec![0.0f32; self.dense_dims];
        if tokens.is_empty() {
            return Ok(EmbeddingOutput {
                dense,
                lexical_weights: HashMap::new(),
            });
        }

        let mut tf: HashMap<&str, u32> = HashMap::new();
        for token in tokens.iter() {
            *tf.entry(token).or_insert(0) += 1;

            self.hash_feature(token.as_bytes(), 1.0, &mut dense);
            let padded: Vec<char> = std::iter::once('#')
                .chain(token.chars())
                .chain(std::iter::once('#'))
                .collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                self.hash_feature(trigram.as_bytes(), TRIGRAM_WEIGHT, &mut dense);
            }
        }

        let norm = dense.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            dense.iter_mut().for_each(|x| *x /= norm);
        }

        // Colliding tokens keep the larger weight, matching the sparse merge rule.
        let scale = 1.0 / (tf.len() as f32).sqrt();
        let mut lexical_weights: HashMap<u32, f32> = HashMap::with_capacity(tf.len());
        for (token, count) in tf {
            let weight = (1.0 + (count as f32).ln()) * scale;
            let slot = lexical_weights.entry(self.token_id(token)).or_insert(0.0);
            *slot = slot.max(weight);
        }

        Ok(EmbeddingOutput {
            dense,
            lexical_weights,
        })
    }

    fn dense_dimensions(&self) -> usize {
        self.dense_dims
    }

    fn sparse_dimensions(&self) -> u32 {
        self.sparse_dims
    }

    fn name(&self) -> &str {
        "lexical"
    }
}
