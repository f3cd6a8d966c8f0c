//! Embedder contract.
//!
//! An embedder turns text into a dense vector and an unordered token → weight
//! map (the raw output of a multi-functionality embedding model). The raw map
//! is never handed to a store directly: [`Embedding::from_output`] checks the
//! dense dimension and normalises the map into a [`SparseVector`] with strictly
//! ascending indices.

/// Hashing-based lexical embedder used when no model backend is configured.
pub mod lexical;
/// Lowercasing tokenizer shared by the lexical embedder and reranker.
pub mod tokenizer;

pub use lexical::LexicalEmbedder;
pub use tokenizer::{tokenize, Tokens};

use crate::error::{Error, Result};
use crate::vector::{DenseVector, SparseVector};
use std::collections::HashMap;
use std::fmt::Debug;

/// Raw embedder output: a dense vector plus unordered lexical weights.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingOutput {
    /// Dense embedding elements.
    pub dense: Vec<f32>,
    /// Token ID → weight. Unordered; may contain zero weights.
    pub lexical_weights: HashMap<u32, f32>,
}

/// Validated embedding ready for insertion or querying.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub dense: DenseVector,
    pub sparse: SparseVector,
}

impl Embedding {
    /// Checks the dense length against `dense_dims` and sorts the lexical weights
    /// into a sparse vector over a `sparse_dims` vocabulary.
    pub fn from_output(
        output: EmbeddingOutput,
        dense_dims: usize,
        sparse_dims: u32,
    ) -> Result<Self> {
        if output.dense.len() != dense_dims {
            return Err(Error::DimensionMismatch {
                expected: dense_dims,
                actual: output.dense.len(),
            });
        }
        let dense = DenseVector::new(output.dense)?;
        let sparse = SparseVector::from_weights(sparse_dims, output.lexical_weights)?;
        Ok(Self { dense, sparse })
    }
}

/// Core trait for embedding backends.
///
/// Object-safe so pipelines can hold an `Arc<dyn Embedder>`.
pub trait Embedder: Send + Sync + Debug {
    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<EmbeddingOutput>;

    /// Embed a batch of texts.
    ///
    /// Backends with batched inference should override this. The default calls
    /// [`embed`](Embedder::embed) for each text.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<EmbeddingOutput>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Length of every dense vector this backend produces.
    fn dense_dimensions(&self) -> usize;

    /// Vocabulary size bounding every sparse index.
    fn sparse_dimensions(&self) -> u32;

    /// Backend name (e.g. "lexical").
    fn name(&self) -> &str;
}

/// Embed `text` and validate the result against the embedder's declared dimensions.
pub fn embed_text(embedder: &dyn Embedder, text: &str) -> Result<Embedding> {
    let output = embedder.embed(text)?;
    Embedding::from_output(output, embedder.dense_dimensions(), embedder.sparse_dimensions())
}
