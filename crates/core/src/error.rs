//! Error type shared by every stage of the pipeline.

use thiserror::Error;

/// Errors raised by vectors, embedders, stores, rerankers, and snapshots.
#[derive(Debug, Error)]
pub enum Error {
    /// A vector's length or vocabulary size differs from what was configured.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Dense vector is empty or holds a non-finite element.
    #[error("invalid dense vector: {0}")]
    InvalidDenseVector(String),

    /// Sparse vector breaks the ascending/unique/in-range/non-negative invariant.
    #[error("invalid sparse vector: {0}")]
    InvalidSparseVector(String),

    /// Schema definition is unusable (empty name, zero dimensions).
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// Operation needs a schema but none was created.
    #[error("schema has not been created")]
    SchemaMissing,

    /// `create_schema` called twice.
    #[error("schema '{0}' already exists")]
    SchemaExists(String),

    /// A record with this ID is already stored.
    #[error("document {0} already exists")]
    DuplicateId(uuid::Uuid),

    /// Index options are invalid or the column is already indexed.
    #[error("invalid index: {0}")]
    InvalidIndex(String),

    /// Retrieval or pipeline parameters are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Document or query text is longer than the accepted maximum.
    #[error("text is {len} bytes, limit is {max}")]
    TextTooLong { len: usize, max: usize },

    /// Text to index is empty or whitespace only.
    #[error("document text is empty")]
    EmptyText,

    /// The embedding backend failed.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// The reranking backend failed or produced an unusable score.
    #[error("rerank failed: {0}")]
    Rerank(String),

    /// Snapshot is truncated, corrupted, or internally inconsistent.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
