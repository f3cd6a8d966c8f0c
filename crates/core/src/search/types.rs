//! Candidate and retrieval result types.

use crate::store::Hit;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Position of a candidate in one column's result list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColumnRank {
    /// 1-based rank within the column's top-K.
    pub rank: usize,
    pub distance: f32,
}

/// A member of the candidate pool: one distinct text with its per-column ranks.
///
/// `dense` and `sparse` are `None` when the text did not appear in that
/// column's top-K. `fusion_score` is set only by rank fusion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: Uuid,
    pub text: Arc<str>,
    pub dense: Option<ColumnRank>,
    pub sparse: Option<ColumnRank>,
    pub fusion_score: Option<f32>,
}

/// Output of one retrieval round.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Retrieval {
    pub dense_hits: Vec<Hit>,
    pub sparse_hits: Vec<Hit>,
    /// Deduplicated union of both hit lists, in fused order.
    pub candidates: Vec<Candidate>,
}
