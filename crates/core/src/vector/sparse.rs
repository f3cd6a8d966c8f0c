//! Sparse token-weight vectors.
//!
//! A sparse vector lives in a vocabulary-sized space (`dims`) and stores only
//! its populated dimensions as parallel `indices` / `values` arrays. Indices are
//! strictly ascending and unique, which lets dot products and distances run as
//! a single merge-join. Stores reject vectors that break this, so embedder
//! output goes through [`SparseVector::from_weights`], which sorts and merges.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sparse vector with strictly ascending, in-range indices and non-negative weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSparse", into = "RawSparse")]
pub struct SparseVector {
    dims: u32,
    indices: Vec<u32>,
    values: Vec<f32>,
}

/// Unchecked wire form; converted through [`SparseVector::new`] on deserialize.
#[derive(Serialize, Deserialize)]
struct RawSparse {
    dims: u32,
    indices: Vec<u32>,
    values: Vec<f32>,
}

impl TryFrom<RawSparse> for SparseVector {
    type Error = Error;

    fn try_from(raw: RawSparse) -> Result<Self> {
        Self::new(raw.dims, raw.indices, raw.values)
    }
}

impl From<SparseVector> for RawSparse {
    fn from(v: SparseVector) -> Self {
        Self {
            dims: v.dims,
            indices: v.indices,
            values: v.values,
        }
    }
}

impl SparseVector {
    /// Builds a vector from already-ordered arrays, validating every invariant.
    ///
    /// Fails if the arrays differ in length, an index is out of range, indices are
    /// not strictly ascending, or a value is negative or non-finite.
    pub fn new(dims: u32, indices: Vec<u32>, values: Vec<f32>) -> Result<Self> {
        if dims == 0 {
            return Err(Error::InvalidSparseVector("dims must be > 0".to_string()));
        }
        if indices.len() != values.len() {
            return Err(Error::InvalidSparseVector(format!(
                "{} indices but {} values",
                indices.len(),
                values.len()
            )));
        }
        for (pos, &idx) in indices.iter().enumerate() {
            if idx >= dims {
                return Err(Error::InvalidSparseVector(format!(
                    "index {} out of range for dims {}",
                    idx, dims
                )));
            }
            if pos > 0 && indices[pos - 1] >= idx {
                return Err(Error::InvalidSparseVector(format!(
                    "indices not strictly ascending at position {} ({} after {})",
                    pos,
                    idx,
                    indices[pos - 1]
                )));
            }
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite() || *v < 0.0) {
            return Err(Error::InvalidSparseVector(format!(
                "weight {} at index {} must be finite and non-negative",
                values[pos], indices[pos]
            )));
        }
        Ok(Self {
            dims,
            indices,
            values,
        })
    }

    /// Normalises an unordered token-weight map into a valid sparse vector.
    ///
    /// Entries are sorted by index, duplicate indices keep their maximum weight,
    /// and exact-zero weights are dropped. Out-of-range indices and negative or
    /// non-finite weights are still rejected.
    pub fn from_weights<I>(dims: u32, weights: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, f32)>,
    {
        let mut entries: Vec<(u32, f32)> = weights.into_iter().collect();
        entries.sort_unstable_by_key(|&(idx, _)| idx);

        let mut indices: Vec<u32> = Vec::with_capacity(entries.len());
        let mut values: Vec<f32> = Vec::with_capacity(entries.len());
        for (idx, weight) in entries {
            match indices.last() {
                Some(&last) if last == idx => {
                    let slot = values.len() - 1;
                    // NaN must survive the merge so validation sees it
                    if weight.is_nan() || weight > values[slot] {
                        values[slot] = weight;
                    }
                }
                _ => {
                    indices.push(idx);
                    values.push(weight);
                }
            }
        }

        let mut kept = 0;
        for i in 0..indices.len() {
            if values[i] != 0.0 {
                indices[kept] = indices[i];
                values[kept] = values[i];
                kept += 1;
            }
        }
        indices.truncate(kept);
        values.truncate(kept);

        Self::new(dims, indices, values)
    }

    /// An all-zero vector in a `dims`-sized space.
    pub fn empty(dims: u32) -> Result<Self> {
        Self::new(dims, Vec::new(), Vec::new())
    }

    /// Vocabulary size of the space this vector lives in.
    pub fn dims(&self) -> u32 {
        self.dims
    }

    /// Populated indices, strictly ascending.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Weights aligned with [`indices`](Self::indices).
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Number of populated dimensions.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if no dimension is populated.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate `(index, weight)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Weight stored at `index`, or 0.0 if unpopulated.
    pub fn get(&self, index: u32) -> f32 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    /// Dot product by merge-join over both index lists.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Squared Euclidean distance over the union of populated indices.
    pub fn squared_l2(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.indices.len() || j < other.indices.len() {
            let d = if j >= other.indices.len()
                || (i < self.indices.len() && self.indices[i] < other.indices[j])
            {
                i += 1;
                self.values[i - 1]
            } else if i >= self.indices.len() || other.indices[j] < self.indices[i] {
                j += 1;
                other.values[j - 1]
            } else {
                i += 1;
                j += 1;
                self.values[i - 1] - other.values[j - 1]
            };
            sum += d * d;
        }
        sum
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }
}

/// Renders the extension's text literal: `{i:v,...}/dims`.
impl fmt::Display for SparseVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (pos, (idx, val)) in self.iter().enumerate() {
            if pos > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", idx, val)?;
        }
        write!(f, "}}/{}", self.dims)
    }
}
