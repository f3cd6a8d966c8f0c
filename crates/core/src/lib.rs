//! # hybridsearch-core
//!
//! Hybrid dense/sparse retrieval: an embedder turns text into one dense vector
//! and one sparse token-weight vector, a store keeps both per document and
//! answers nearest-neighbour queries per column, the query engine unions the
//! dense and sparse top-K, and a reranker orders the union.
//!
//! The embedding model, the vector database and the cross-encoder are
//! external collaborators reached through the [`Embedder`](embedding::Embedder),
//! [`Store`](store::Store) and [`Reranker`](rerank::Reranker) traits. Each has a
//! deterministic in-process implementation so the pipeline runs offline.
//!
//! ```text
//! text → Embedder → { DenseVector, SparseVector } → Store (dense / sparse columns)
//! query → Embedder → dense top-K ∪ sparse top-K → [RRF] → Reranker → ranked
//! ```

/// Global configuration constants: dimensions, limits, and tuning defaults.
pub mod config;
/// Crate-wide error type.
pub mod error;
/// Embedder contract, tokenizer, and the hashing-based lexical embedder.
pub mod embedding;
/// End-to-end driver wiring embedder, store, query engine, and reranker.
pub mod pipeline;
/// Reranker contract and the lexical-overlap reranker.
pub mod rerank;
/// Query engine: per-column retrieval, candidate union, and rank fusion.
pub mod search;
/// Store contract, in-memory store, snapshots, and SQL statement rendering.
pub mod store;
/// Dense and sparse vectors with their distance metrics.
pub mod vector;

pub use error::{Error, Result};
