//! Store contract and the fixed document schema.
//!
//! A store holds one row per document (`id`, `text`, `dense`, `sparse`), builds
//! approximate-nearest-neighbour indexes over the vector columns, and answers
//! top-K queries per column. The vector database is an external collaborator;
//! [`MemoryStore`] is the exact-scan, in-process implementation.

/// Thread-safe in-memory store.
pub mod memory;
/// Snapshot save/load with a CRC32 footer.
pub mod persistence;
/// SQL statements for the external vector extension.
pub mod sql;

pub use memory::MemoryStore;
pub use persistence::{load_store, save_store, snapshot_path};

use crate::config::{HNSW_DEFAULT_EF_CONSTRUCTION, HNSW_DEFAULT_M, MAX_DENSE_DIMS};
use crate::embedding::Embedding;
use crate::error::{Error, Result};
use crate::vector::{DenseVector, DistanceMetric, SparseVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Table definition: name plus the widths of the two vector columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub table: String,
    pub dense_dims: usize,
    pub sparse_dims: u32,
}

impl Schema {
    pub fn new(table: impl Into<String>, dense_dims: usize, sparse_dims: u32) -> Self {
        Self {
            table: table.into(),
            dense_dims,
            sparse_dims,
        }
    }

    /// Checks the table name is a plain SQL identifier and both dimensions are usable.
    pub fn validate(&self) -> Result<()> {
        let mut chars = self.table.chars();
        match chars.next() {
            None => return Err(Error::InvalidSchema("table name is empty".into())),
            Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
                return Err(Error::InvalidSchema(format!(
                    "table name '{}' must start with a letter or underscore",
                    self.table
                )));
            }
            _ => {}
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::InvalidSchema(format!(
                "table name '{}' may only contain ASCII letters, digits, and underscores",
                self.table
            )));
        }
        if self.dense_dims == 0 || self.dense_dims > MAX_DENSE_DIMS {
            return Err(Error::InvalidSchema(format!(
                "dense dimension must be in 1..={}, got {}",
                MAX_DENSE_DIMS, self.dense_dims
            )));
        }
        if self.sparse_dims == 0 {
            return Err(Error::InvalidSchema("sparse dimension must be positive".into()));
        }
        Ok(())
    }
}

/// Vector-valued column of the document table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorColumn {
    Dense,
    Sparse,
}

impl VectorColumn {
    /// Column name in the table.
    pub fn name(&self) -> &'static str {
        match self {
            VectorColumn::Dense => "dense",
            VectorColumn::Sparse => "sparse",
        }
    }
}

impl fmt::Display for VectorColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index algorithm and its build options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexAlgorithm {
    Hnsw { m: usize, ef_construction: usize },
    Flat,
}

impl Default for IndexAlgorithm {
    fn default() -> Self {
        IndexAlgorithm::Hnsw {
            m: HNSW_DEFAULT_M,
            ef_construction: HNSW_DEFAULT_EF_CONSTRUCTION,
        }
    }
}

/// Request to index one vector column under one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSpec {
    pub column: VectorColumn,
    pub metric: DistanceMetric,
    pub algorithm: IndexAlgorithm,
}

impl IndexSpec {
    /// HNSW with default options.
    pub fn hnsw(column: VectorColumn, metric: DistanceMetric) -> Self {
        Self {
            column,
            metric,
            algorithm: IndexAlgorithm::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let IndexAlgorithm::Hnsw { m, ef_construction } = self.algorithm {
            if m < 2 {
                return Err(Error::InvalidIndex(format!("hnsw m must be >= 2, got {}", m)));
            }
            if ef_construction < m {
                return Err(Error::InvalidIndex(format!(
                    "hnsw ef_construction ({}) must be >= m ({})",
                    ef_construction, m
                )));
            }
        }
        Ok(())
    }
}

/// Query vector; the column searched is implied by the variant.
#[derive(Debug, Clone, Copy)]
pub enum QueryVector<'a> {
    Dense(&'a DenseVector),
    Sparse(&'a SparseVector),
}

impl QueryVector<'_> {
    pub fn column(&self) -> VectorColumn {
        match self {
            QueryVector::Dense(_) => VectorColumn::Dense,
            QueryVector::Sparse(_) => VectorColumn::Sparse,
        }
    }
}

/// One row of the document table.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
    pub id: Uuid,
    pub text: String,
    pub dense: DenseVector,
    pub sparse: SparseVector,
}

impl DocumentRecord {
    /// Creates a record with a fresh v4 ID.
    pub fn new(text: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            dense: embedding.dense,
            sparse: embedding.sparse,
        }
    }
}

/// Single query result. Lower distance is closer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub id: Uuid,
    pub text: Arc<str>,
    pub distance: f32,
}

/// Vector store contract.
///
/// Implementations take `&self` and synchronise internally so one store can be
/// shared behind an `Arc<dyn Store>`.
pub trait Store: Send + Sync + fmt::Debug {
    /// Creates the document table. Fails if it already exists.
    fn create_schema(&self, schema: &Schema) -> Result<()>;

    /// Inserts one row and returns its ID.
    fn insert(&self, record: DocumentRecord) -> Result<Uuid>;

    /// Builds an index over one vector column.
    fn create_index(&self, spec: &IndexSpec) -> Result<()>;

    /// Top-`k` rows by ascending `metric` distance to `vector`, ties in insertion order.
    fn query(&self, vector: QueryVector<'_>, metric: DistanceMetric, k: usize) -> Result<Vec<Hit>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The created schema, if any.
    fn schema(&self) -> Option<Schema>;

    /// Indexes created so far, in creation order.
    fn indexes(&self) -> Vec<IndexSpec>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_validation() {
        assert!(Schema::new("documents", 1024, 250_002).validate().is_ok());
        assert!(Schema::new("_docs2", 3, 10).validate().is_ok());
        for bad in ["", "2docs", "docs; DROP TABLE x", "my-table"] {
            assert!(
                matches!(Schema::new(bad, 3, 10).validate(), Err(Error::InvalidSchema(_))),
                "table name {:?} should be rejected",
                bad
            );
        }
        assert!(Schema::new("docs", 0, 10).validate().is_err());
        assert!(Schema::new("docs", 3, 0).validate().is_err());
        assert!(Schema::new("docs", MAX_DENSE_DIMS + 1, 10).validate().is_err());
    }

    #[test]
    fn test_index_spec_validation() {
        let ok = IndexSpec::hnsw(VectorColumn::Dense, DistanceMetric::Euclidean);
        assert!(ok.validate().is_ok());

        let small_m = IndexSpec {
            algorithm: IndexAlgorithm::Hnsw { m: 1, ef_construction: 10 },
            ..ok
        };
        assert!(matches!(small_m.validate(), Err(Error::InvalidIndex(_))));

        let low_ef = IndexSpec {
            algorithm: IndexAlgorithm::Hnsw { m: 16, ef_construction: 8 },
            ..ok
        };
        assert!(matches!(low_ef.validate(), Err(Error::InvalidIndex(_))));

        let flat = IndexSpec {
            algorithm: IndexAlgorithm::Flat,
            ..ok
        };
        assert!(flat.validate().is_ok());
    }

    #[test]
    fn test_query_vector_column() {
        let d = DenseVector::new(vec![1.0]).unwrap();
        let s = SparseVector::empty(4).unwrap();
        assert_eq!(QueryVector::Dense(&d).column(), VectorColumn::Dense);
        assert_eq!(QueryVector::Sparse(&s).column(), VectorColumn::Sparse);
    }
}
