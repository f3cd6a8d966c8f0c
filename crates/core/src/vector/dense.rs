//! Dense embedding vectors.
//!
//! Kernels are plain chunk-free loops over `f32` slices; callers guarantee equal
//! lengths (the store checks dimensions against its schema before scoring).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fixed-length dense embedding. Always non-empty with finite elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct DenseVector(Vec<f32>);

impl DenseVector {
    /// Wraps `values`, rejecting an empty vector or any NaN/infinite element.
    pub fn new(values: Vec<f32>) -> Result<Self> {
        if values.is_empty() {
            return Err(Error::InvalidDenseVector("vector is empty".to_string()));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidDenseVector(format!(
                "element {} is not finite ({})",
                pos, values[pos]
            )));
        }
        Ok(Self(values))
    }

    /// Number of dimensions.
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Borrow the raw elements.
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f32 {
        dot(&self.0, &self.0).sqrt()
    }

    /// Consume into the raw elements.
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl TryFrom<Vec<f32>> for DenseVector {
    type Error = Error;

    fn try_from(values: Vec<f32>) -> Result<Self> {
        Self::new(values)
    }
}

impl From<DenseVector> for Vec<f32> {
    fn from(v: DenseVector) -> Self {
        v.0
    }
}

/// Renders the extension's text literal: `[v0,v1,...]`.
impl fmt::Display for DenseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", v)?;
        }
        f.write_str("]")
    }
}

pub(crate) fn dot(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for i in 0..a.len().min(b.len()) {
        sum += a[i] * b[i];
    }
    sum
}

pub(crate) fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for i in 0..a.len().min(b.len()) {
        let d = a[i] - b[i];
        sum += d * d;
    }
    sum
}

/// Cosine similarity; 0.0 when either operand has (near) zero norm.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for i in 0..a.len().min(b.len()) {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }
    dot / denom
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty() {
        assert!(matches!(
            DenseVector::new(vec![]),
            Err(Error::InvalidDenseVector(_))
        ));
    }

    #[test]
    fn test_new_rejects_non_finite() {
        let err = DenseVector::new(vec![1.0, f32::NAN, 0.0]).unwrap_err();
        assert!(err.to_string().contains("element 1"), "got: {err}");
        assert!(DenseVector::new(vec![f32::INFINITY]).is_err());
    }

    #[test]
    fn test_dimension_and_norm() {
        let v = DenseVector::new(vec![3.0, 4.0]).unwrap();
        assert_eq!(v.dimension(), 2);
        assert!((v.norm() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_kernels() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert!((dot(&a, &b) - 32.0).abs() < 1e-6);
        assert!((squared_l2(&a, &b) - 27.0).abs() < 1e-6);
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_display_literal() {
        let v = DenseVector::new(vec![0.5, -1.0, 2.0]).unwrap();
        assert_eq!(v.to_string(), "[0.5,-1,2]");
    }

    #[test]
    fn test_deserialize_validates() {
        let bytes = bincode::serialize(&vec![f32::NAN]).unwrap();
        let decoded: std::result::Result<DenseVector, _> = bincode::deserialize(&bytes);
        assert!(decoded.is_err(), "NaN payload must not deserialize");
    }
}
