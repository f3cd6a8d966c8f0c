//! Distance metrics for nearest-neighbour queries.
//!
//! All metrics return a distance where **lower is better** (more similar), so a
//! store can rank any column with a single ascending sort. Dense and sparse
//! columns share the same three metrics; the sparse column conventionally uses
//! [`DistanceMetric::DotProduct`] since it only touches the populated indices.

use crate::vector::dense;
use crate::vector::{DenseVector, SparseVector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distance metric used for vector similarity computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Squared Euclidean distance: `Σ(x_i − y_i)²`. Range: \[0, ∞).
    Euclidean,
    /// Negative dot product: `−Σ x_i·y_i`. Lower = higher similarity.
    DotProduct,
    /// Cosine distance: `1 − cosine_similarity`. Range: \[0, 2\].
    Cosine,
}

impl DistanceMetric {
    /// Distance between two dense vectors of equal dimension.
    pub fn dense_distance(&self, a: &DenseVector, b: &DenseVector) -> f32 {
        let (a, b) = (a.as_slice(), b.as_slice());
        match self {
            DistanceMetric::Euclidean => dense::squared_l2(a, b),
            DistanceMetric::DotProduct => -dense::dot(a, b),
            DistanceMetric::Cosine => 1.0 - dense::cosine_similarity(a, b),
        }
    }

    /// Distance between two sparse vectors in the same space.
    pub fn sparse_distance(&self, a: &SparseVector, b: &SparseVector) -> f32 {
        match self {
            DistanceMetric::Euclidean => a.squared_l2(b),
            DistanceMetric::DotProduct => -a.dot(b),
            DistanceMetric::Cosine => {
                let denom = a.norm() * b.norm();
                if denom < 1e-10 {
                    1.0
                } else {
                    1.0 - a.dot(b) / denom
                }
            }
        }
    }

    /// Ordering operator the vector extension uses for this metric.
    pub fn operator(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "<->",
            DistanceMetric::DotProduct => "<#>",
            DistanceMetric::Cosine => "<=>",
        }
    }

    /// Operator-class suffix for index creation (`vector_l2_ops`, `svector_dot_ops`, ...).
    pub fn opclass_suffix(&self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "l2_ops",
            DistanceMetric::DotProduct => "dot_ops",
            DistanceMetric::Cosine => "cos_ops",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::DotProduct => "dot_product",
            DistanceMetric::Cosine => "cosine",
        })
    }
}
