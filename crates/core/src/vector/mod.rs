//! Dense and sparse vector types.
//!
//! A [`DenseVector`] is a fixed-length `f32` sequence where nearly every element
//! is non-zero. A [`SparseVector`] holds only the populated token dimensions of a
//! vocabulary-sized space, as parallel ascending index/value arrays.
//! [`DistanceMetric`] evaluates either kind; lower distance means closer.

/// Dense `f32` vectors and their scalar kernels.
pub mod dense;
/// Distance metrics shared by the dense and sparse columns.
pub mod distance;
/// Sparse token-weight vectors with the strictly-ascending index invariant.
pub mod sparse;

pub use dense::DenseVector;
pub use distance::DistanceMetric;
pub use sparse::SparseVector;
