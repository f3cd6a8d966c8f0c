//! End-to-end hybrid search driver.
//!
//! [`HybridSearch`] wires an embedder, a store, the query engine and an
//! optional reranker:
//!
//! 1. `setup` creates the schema from the embedder's dimensions and the two
//!    vector indexes.
//! 2. `index_documents` embeds and inserts each text.
//! 3. `search` embeds the query, retrieves dense and sparse top-K, fuses the
//!    pool, and reranks it.

use crate::config::MAX_TEXT_LEN;
use crate::embedding::{embed_text, Embedder, Embedding};
use crate::error::{Error, Result};
use crate::rerank::{rerank, Reranker};
use crate::search::{Candidate, QueryEngine, RetrievalConfig};
use crate::store::{DocumentRecord, Hit, IndexSpec, Schema, Store, VectorColumn};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Final position of a candidate.
///
/// `score` is the reranker score, or the fusion score when no reranker ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub candidate: Candidate,
    pub score: Option<f32>,
}

/// Everything one search produced, stage by stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchOutcome {
    pub dense_hits: Vec<Hit>,
    pub sparse_hits: Vec<Hit>,
    pub candidates: Vec<Candidate>,
    pub ranked: Vec<RankedResult>,
}

/// Hybrid dense/sparse search over shared collaborators.
#[derive(Debug, Clone)]
pub struct HybridSearch {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn Store>,
    reranker: Option<Arc<dyn Reranker>>,
    engine: QueryEngine,
    dense_index: IndexSpec,
    sparse_index: IndexSpec,
}

impl HybridSearch {
    /// Creates a pipeline with default HNSW indexes matching the retrieval metrics.
    ///
    /// Fails with `InvalidConfig` if `retrieval` does not validate.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn Store>,
        reranker: Option<Arc<dyn Reranker>>,
        retrieval: RetrievalConfig,
    ) -> Result<Self> {
        let dense_index = IndexSpec::hnsw(VectorColumn::Dense, retrieval.dense_metric);
        let sparse_index = IndexSpec::hnsw(VectorColumn::Sparse, retrieval.sparse_metric);
        Ok(Self {
            engine: QueryEngine::new(Arc::clone(&store), retrieval)?,
            embedder,
            store,
            reranker,
            dense_index,
            sparse_index,
        })
    }

    /// Overrides the index specs used by [`setup`](Self::setup).
    pub fn with_indexes(mut self, dense_index: IndexSpec, sparse_index: IndexSpec) -> Self {
        self.dense_index = dense_index;
        self.sparse_index = sparse_index;
        self
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn retrieval(&self) -> &RetrievalConfig {
        self.engine.config()
    }

    /// Schema the embedder's output fits.
    pub fn schema_for(&self, table: &str) -> Schema {
        Schema::new(
            table,
            self.embedder.dense_dimensions(),
            self.embedder.sparse_dimensions(),
        )
    }

    /// Creates the table and both vector indexes.
    pub fn setup(&self, table: &str) -> Result<Schema> {
        if self.dense_index.column != VectorColumn::Dense
            || self.sparse_index.column != VectorColumn::Sparse
        {
            return Err(Error::InvalidIndex(
                "dense and sparse index specs must target their own columns".into(),
            ));
        }
        let schema = self.schema_for(table);
        self.store.create_schema(&schema)?;
        self.store.create_index(&self.dense_index)?;
        self.store.create_index(&self.sparse_index)?;
        tracing::info!(
            "Set up table '{}' with {} embedder (dense={}, sparse={})",
            schema.table,
            self.embedder.name(),
            schema.dense_dims,
            schema.sparse_dims
        );
        Ok(schema)
    }

    /// Embeds and inserts each text, returning the new IDs in input order.
    ///
    /// Every text and every embedding is checked before anything is inserted,
    /// so a failed batch leaves the store unchanged.
    pub fn index_documents<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Uuid>> {
        for text in texts {
            check_text(text.as_ref())?;
        }
        let dense_dims = self.embedder.dense_dimensions();
        let sparse_dims = self.embedder.sparse_dimensions();
        let schema = self.store.schema().ok_or(Error::SchemaMissing)?;
        if schema.dense_dims != dense_dims {
            return Err(Error::DimensionMismatch {
                expected: schema.dense_dims,
                actual: dense_dims,
            });
        }
        if schema.sparse_dims != sparse_dims {
            return Err(Error::DimensionMismatch {
                expected: schema.sparse_dims as usize,
                actual: sparse_dims as usize,
            });
        }

        let refs: Vec<&str> = texts.iter().map(|t| t.as_ref()).collect();
        let outputs = self.embedder.embed_batch(&refs)?;
        if outputs.len() != refs.len() {
            return Err(Error::Embedding(format!(
                "{} returned {} embeddings for {} texts",
                self.embedder.name(),
                outputs.len(),
                refs.len()
            )));
        }
        let embeddings = outputs
            .into_iter()
            .map(|output| Embedding::from_output(output, dense_dims, sparse_dims))
            .collect::<Result<Vec<_>>>()?;

        let mut ids = Vec::with_capacity(refs.len());
        for (text, embedding) in refs.iter().zip(embeddings) {
            ids.push(self.store.insert(DocumentRecord::new(*text, embedding))?);
        }
        tracing::info!("Indexed {} documents ({} total)", ids.len(), self.store.len());
        Ok(ids)
    }

    /// Runs the full query path. A blank query yields an empty outcome.
    pub fn search(&self, query: &str) -> Result<SearchOutcome> {
        if query.trim().is_empty() {
            tracing::warn!("Blank query; returning no results");
            return Ok(SearchOutcome::default());
        }
        check_text(query)?;

        let embedding = embed_text(self.embedder.as_ref(), query)?;
        let retrieval = self.engine.retrieve(&embedding)?;

        let ranked = match &self.reranker {
            Some(reranker) => rerank(reranker.as_ref(), query, retrieval.candidates.clone())?
                .into_iter()
                .map(|r| RankedResult {
                    candidate: r.candidate,
                    score: Some(r.score),
                })
                .collect(),
            None => retrieval
                .candidates
                .iter()
                .map(|c| RankedResult {
                    candidate: c.clone(),
                    score: c.fusion_score,
                })
                .collect(),
        };

        Ok(SearchOutcome {
            dense_hits: retrieval.dense_hits,
            sparse_hits: retrieval.sparse_hits,
            candidates: retrieval.candidates,
            ranked,
        })
    }
}

fn check_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(Error::EmptyText);
    }
    if text.len() > MAX_TEXT_LEN {
        return Err(Error::TextTooLong {
            len: text.len(),
            max: MAX_TEXT_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::LexicalEmbedder;
    use crate::rerank::LexicalReranker;
    use crate::search::Fusion;
    use crate::store::MemoryStore;

    fn pipeline(reranker: bool, retrieval: RetrievalConfig) -> HybridSearch {
        let embedder = Arc::new(LexicalEmbedder::new(128, 30_000).unwrap());
        let store = Arc::new(MemoryStore::new());
        let reranker: Option<Arc<dyn Reranker>> = if reranker {
            Some(Arc::new(LexicalReranker::new()))
        } else {
            None
        };
        let p = HybridSearch::new(embedder, store, reranker, retrieval).unwrap();
        p.setup("docs").unwrap();
        p
    }

    #[test]
    fn test_setup_creates_schema_and_indexes() {
        let p = pipeline(true, RetrievalConfig::default());
        let schema = p.store().schema().unwrap();
        assert_eq!(schema, Schema::new("docs", 128, 30_000));
        let indexes = p.store().indexes();
        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[0].column, VectorColumn::Dense);
        assert_eq!(indexes[1].metric, crate::vector::DistanceMetric::DotProduct);
        assert!(matches!(p.setup("docs"), Err(Error::SchemaExists(_))));
    }

    #[test]
    fn test_index_rejects_blank_text_before_inserting() {
        let p = pipeline(true, RetrievalConfig::default());
        let err = p.index_documents(&["fine", "   "]).unwrap_err();
        assert!(matches!(err, Error::EmptyText));
        assert_eq!(p.store().len(), 0);
    }

    #[test]
    fn test_search_reranks_candidates() {
        let p = pipeline(true, RetrievalConfig::default());
        p.index_documents(&["Definition of BM25", "What is BM25?", "dense embeddings"])
            .unwrap();
        let out = p.search("What is BM25?").unwrap();
        assert_eq!(&*out.sparse_hits[0].text, "What is BM25?");
        assert_eq!(&*out.ranked[0].candidate.text, "What is BM25?");
        assert_eq!(out.ranked.len(), out.candidates.len());
        let scores: Vec<f32> = out.ranked.iter().map(|r| r.score.unwrap()).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_search_without_reranker_keeps_union_order() {
        let p = pipeline(false, RetrievalConfig::default());
        p.index_documents(&["apple pie", "apple tart", "pear"]).unwrap();
        let out = p.search("apple").unwrap();
        let ranked: Vec<&str> = out.ranked.iter().map(|r| &*r.candidate.text).collect();
        let union: Vec<&str> = out.candidates.iter().map(|c| &*c.text).collect();
        assert_eq!(ranked, union);
        assert!(out.ranked.iter().all(|r| r.score.is_none()));
    }

    #[test]
    fn test_search_without_reranker_uses_rrf_score() {
        let retrieval = RetrievalConfig {
            fusion: Fusion::Rrf { k: 60.0 },
            ..Default::default()
        };
        let p = pipeline(false, retrieval);
        p.index_documents(&["apple pie", "pear"]).unwrap();
        let out = p.search("apple").unwrap();
        assert!(out.ranked.iter().all(|r| r.score.is_some()));
    }

    #[test]
    fn test_blank_query_returns_empty_outcome() {
        let p = pipeline(true, RetrievalConfig::default());
        p.index_documents(&["something"]).unwrap();
        let out = p.search("  \n").unwrap();
        assert!(out.dense_hits.is_empty());
        assert!(out.ranked.is_empty());
    }

    #[test]
    fn test_setup_rejects_swapped_index_columns() {
        use crate::vector::DistanceMetric;
        let embedder = Arc::new(LexicalEmbedder::new(16, 100).unwrap());
        let dense = IndexSpec::hnsw(VectorColumn::Sparse, DistanceMetric::DotProduct);
        let sparse = IndexSpec::hnsw(VectorColumn::Dense, DistanceMetric::Euclidean);
        let store = Arc::new(MemoryStore::new());
        let p = HybridSearch::new(embedder, store, None, RetrievalConfig::default())
            .unwrap()
            .with_indexes(dense, sparse);
        assert!(matches!(p.setup("docs"), Err(Error::InvalidIndex(_))));
    }

    #[test]
    fn test_new_rejects_invalid_retrieval() {
        let embedder = Arc::new(LexicalEmbedder::new(16, 100).unwrap());
        let retrieval = RetrievalConfig {
            fusion: Fusion::Rrf { k: -1.0 },
            ..Default::default()
        };
        let result = HybridSearch::new(embedder, Arc::new(MemoryStore::new()), None, retrieval);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_oversized_text_is_rejected() {
        let p = pipeline(false, RetrievalConfig::default());
        let long = "word ".repeat(MAX_TEXT_LEN / 5 + 1);
        match p.index_documents(&[long.as_str()]) {
            Err(Error::TextTooLong { len, max }) => {
                assert_eq!(len, long.len());
                assert_eq!(max, MAX_TEXT_LEN);
            }
            other => panic!("expected TextTooLong, got {:?}", other),
        }
        assert!(matches!(p.search(&long), Err(Error::TextTooLong { .. })));
        assert_eq!(p.store().len(), 0);
    }

    #[test]
    fn test_index_requires_matching_schema() {
        let embedder = Arc::new(LexicalEmbedder::new(16, 100).unwrap());
        let store = Arc::new(MemoryStore::new());
        let p = HybridSearch::new(embedder, store.clone(), None, RetrievalConfig::default())
            .unwrap();
        assert!(matches!(p.index_documents(&["text"]), Err(Error::SchemaMissing)));

        store.create_schema(&Schema::new("docs", 32, 100)).unwrap();
        assert!(matches!(
            p.index_documents(&["text"]),
            Err(Error::DimensionMismatch { expected: 32, actual: 16 })
        ));
        assert!(store.is_empty());
    }
}
