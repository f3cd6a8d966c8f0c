//! Query engine over a [`Store`].

use super::fusion::{rrf_fusion, union_by_text};
use super::types::Retrieval;
use super::{Fusion, RetrievalConfig};
use crate::embedding::Embedding;
use crate::error::Result;
use crate::store::{QueryVector, Store};
use std::sync::Arc;

/// Issues the dense and sparse top-K queries independently, then builds the
/// candidate pool.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    store: Arc<dyn Store>,
    config: RetrievalConfig,
}

impl QueryEngine {
    /// Fails with `InvalidConfig` if `config` does not validate.
    pub fn new(store: Arc<dyn Store>, config: RetrievalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn retrieve(&self, query: &Embedding) -> Result<Retrieval> {
        let dense_hits = self.store.query(
            QueryVector::Dense(&query.dense),
            self.config.dense_metric,
            self.config.dense_k,
        )?;
        let sparse_hits = self.store.query(
            QueryVector::Sparse(&query.sparse),
            self.config.sparse_metric,
            self.config.sparse_k,
        )?;

        let mut candidates = union_by_text(&dense_hits, &sparse_hits);
        if let Fusion::Rrf { k } = self.config.fusion {
            rrf_fusion(&mut candidates, k);
        }

        tracing::debug!(
            dense = dense_hits.len(),
            sparse = sparse_hits.len(),
            candidates = candidates.len(),
            "retrieved"
        );
        Ok(Retrieval {
            dense_hits,
            sparse_hits,
            candidates,
        })
    }
}
