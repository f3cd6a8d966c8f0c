//! Global configuration constants for hybridsearch.
//!
//! Dimensions, limits, and index defaults live here. Runtime configuration
//! (TOML file, CLI flags) is layered on top of these by the binary.

/// Dense embedding dimension of the reference model (e.g. a 1024-wide encoder).
pub const DEFAULT_DENSE_DIMS: usize = 1024;

/// Sparse vocabulary size of the reference model's tokenizer.
///
/// Every sparse index is a token ID strictly below this bound.
pub const DEFAULT_SPARSE_DIMS: u32 = 250_002;

/// Default number of results requested from each vector column.
pub const DEFAULT_TOP_K: usize = 5;

/// Reciprocal Rank Fusion (RRF) constant `k`.
///
/// Used in the formula `1 / (k + rank)` to combine ranked lists.
/// Standard value is 60.0 (from the original RRF paper).
pub const RRF_K: f32 = 60.0;

/// Default number of bidirectional links per HNSW node requested from the store.
pub const HNSW_DEFAULT_M: usize = 16;

/// Default ef parameter during HNSW index construction requested from the store.
pub const HNSW_DEFAULT_EF_CONSTRUCTION: usize = 100;

/// Maximum allowed dense embedding dimension.
pub const MAX_DENSE_DIMS: usize = 16_000;

/// Maximum number of results (`k`) per column query.
pub const MAX_K: usize = 10_000;

/// Maximum length of document text in bytes.
pub const MAX_TEXT_LEN: usize = 1_000_000;

/// Default table name for the document schema.
pub const DEFAULT_TABLE: &str = "documents";

/// Default directory for store snapshots.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// File extension of store snapshots.
pub const SNAPSHOT_EXTENSION: &str = "hss";
