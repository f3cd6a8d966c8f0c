//! Query engine: per-column top-K retrieval and candidate pool fusion.

/// Query engine issuing the dense and sparse queries.
pub mod engine;
/// Candidate union and Reciprocal Rank Fusion.
pub mod fusion;
/// Candidate and retrieval types.
pub mod types;

pub use engine::QueryEngine;
pub use fusion::{rrf_fusion, union_by_text};
pub use types::{Candidate, ColumnRank, Retrieval};

use crate::config::{DEFAULT_TOP_K, MAX_K, RRF_K};
use crate::error::{Error, Result};
use crate::vector::DistanceMetric;
use serde::{Deserialize, Serialize};

/// How the candidate pool is ordered before reranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Fusion {
    /// Dense hits in rank order, then sparse-only hits.
    #[default]
    Union,
    /// Reciprocal Rank Fusion with constant `k`.
    Rrf {
        #[serde(default = "default_rrf_k")]
        k: f32,
    },
}

fn default_rrf_k() -> f32 {
    RRF_K
}

/// Retrieval parameters for one query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub dense_k: usize,
    pub sparse_k: usize,
    pub dense_metric: DistanceMetric,
    pub sparse_metric: DistanceMetric,
    pub fusion: Fusion,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            dense_k: DEFAULT_TOP_K,
            sparse_k: DEFAULT_TOP_K,
            dense_metric: DistanceMetric::Euclidean,
            sparse_metric: DistanceMetric::DotProduct,
            fusion: Fusion::Union,
        }
    }
}

impl RetrievalConfig {
    /// Same `k` for both columns.
    pub fn with_k(mut self, k: usize) -> Self {
        self.dense_k = k;
        self.sparse_k = k;
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, k) in [("dense_k", self.dense_k), ("sparse_k", self.sparse_k)] {
            if k > MAX_K {
                return Err(Error::InvalidConfig(format!(
                    "{} must be <= {}, got {}",
                    name, MAX_K, k
                )));
            }
        }
        if let Fusion::Rrf { k } = self.fusion {
            if !(k.is_finite() && k >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "rrf k must be finite and non-negative, got {}",
                    k
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = RetrievalConfig::default();
        assert_eq!(cfg.dense_k, 5);
        assert_eq!(cfg.sparse_k, 5);
        assert_eq!(cfg.dense_metric, DistanceMetric::Euclidean);
        assert_eq!(cfg.sparse_metric, DistanceMetric::DotProduct);
        assert_eq!(cfg.fusion, Fusion::Union);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_limits() {
        assert!(RetrievalConfig::default().with_k(MAX_K + 1).validate().is_err());
        let bad_rrf = RetrievalConfig {
            fusion: Fusion::Rrf { k: f32::NAN },
            ..Default::default()
        };
        assert!(bad_rrf.validate().is_err());
    }

    #[test]
    fn test_fusion_deserialize() {
        let f: Fusion = serde_json::from_str(r#"{"method":"rrf"}"#).unwrap();
        assert_eq!(f, Fusion::Rrf { k: 60.0 });
        let f: Fusion = serde_json::from_str(r#"{"method":"union"}"#).unwrap();
        assert_eq!(f, Fusion::Union);
    }
}
