//! Candidate pool construction and rank fusion.
//!
//! The pool is the set union of dense and sparse result texts: dense hits in
//! rank order, then the sparse hits not already present. Reciprocal Rank
//! Fusion optionally reorders it by `Σ 1 / (k + rank)`.

use super::types::{Candidate, ColumnRank};
use crate::store::Hit;
use std::collections::HashMap;
use std::sync::Arc;

/// Union of dense and sparse hits with no duplicate texts.
///
/// A text matched by both columns keeps the ID of its dense hit. When a column
/// returns the same text twice (duplicate documents), its first rank is kept.
pub fn union_by_text(dense_hits: &[Hit], sparse_hits: &[Hit]) -> Vec<Candidate> {
    let mut pool: Vec<Candidate> = Vec::with_capacity(dense_hits.len() + sparse_hits.len());
    let mut position: HashMap<Arc<str>, usize> = HashMap::with_capacity(pool.capacity());

    for (i, hit) in dense_hits.iter().enumerate() {
        if position.contains_key(&hit.text) {
            continue;
        }
        position.insert(Arc::clone(&hit.text), pool.len());
        pool.push(Candidate {
            id: hit.id,
            text: Arc::clone(&hit.text),
            dense: Some(ColumnRank {
                rank: i + 1,
                distance: hit.distance,
            }),
            sparse: None,
            fusion_score: None,
        });
    }

    for (i, hit) in sparse_hits.iter().enumerate() {
        let rank = ColumnRank {
            rank: i + 1,
            distance: hit.distance,
        };
        match position.get(&hit.text) {
            Some(&pos) => {
                let candidate = &mut pool[pos];
                if candidate.sparse.is_none() {
                    candidate.sparse = Some(rank);
                }
            }
            None => {
                position.insert(Arc::clone(&hit.text), pool.len());
                pool.push(Candidate {
                    id: hit.id,
                    text: Arc::clone(&hit.text),
                    dense: None,
                    sparse: Some(rank),
                    fusion_score: None,
                });
            }
        }
    }

    pool
}

/// Reciprocal Rank Fusion over the pool's column ranks.
/// score(d) = sum(1 / (k + rank_i(d)))
///
/// Sorts by descending score; the sort is stable, so ties keep union order.
pub fn rrf_fusion(candidates: &mut [Candidate], k: f32) {
    for c in candidates.iter_mut() {
        let score: f32 = [c.dense, c.sparse]
            .iter()
            .flatten()
            .map(|r| 1.0 / (k + r.rank as f32))
            .sum();
        c.fusion_score = Some(score);
    }
    candidates.sort_by(|a, b| {
        let sa = a.fusion_score.unwrap_or(0.0);
        let sb = b.fusion_score.unwrap_or(0.0);
        sb.total_cmp(&sa)
    });
}
