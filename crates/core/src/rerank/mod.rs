//! Reranker contract.
//!
//! A reranker scores (query, candidate) pairs; higher is more relevant. The
//! cross-encoder is an external collaborator. [`rerank`] applies any backend
//! and orders the pool with a stable descending sort.

/// Token-overlap reranker.
pub mod lexical;

pub use lexical::LexicalReranker;

use crate::error::{Error, Result};
use crate::search::Candidate;
use serde::Serialize;
use std::fmt::Debug;

/// Core trait for reranking backends.
pub trait Reranker: Send + Sync + Debug {
    /// Relevance of `candidate` to `query`.
    fn score(&self, query: &str, candidate: &str) -> Result<f32>;

    /// Scores for every candidate, in input order.
    fn score_batch(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>> {
        candidates.iter().map(|c| self.score(query, c)).collect()
    }

    fn name(&self) -> &str;
}

/// A candidate with its reranker score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reranked {
    pub candidate: Candidate,
    pub score: f32,
}

/// Score every candidate and sort by descending score.
///
/// The sort is stable: equal scores keep their input order.
pub fn rerank(
    reranker: &dyn Reranker,
    query: &str,
    candidates: Vec<Candidate>,
) -> Result<Vec<Reranked>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }
    let texts: Vec<&str> = candidates.iter().map(|c| &*c.text).collect();
    let scores = reranker.score_batch(query, &texts)?;
    if scores.len() != candidates.len() {
        return Err(Error::Rerank(format!(
            "{} returned {} scores for {} candidates",
            reranker.name(),
            scores.len(),
            candidates.len()
        )));
    }
    if let Some(pos) = scores.iter().position(|s| s.is_nan()) {
        return Err(Error::Rerank(format!(
            "{} returned NaN for candidate {}",
            reranker.name(),
            pos
        )));
    }

    let mut ranked: Vec<Reranked> = candidates
        .into_iter()
        .zip(scores)
        .map(|(candidate, score)| Reranked { candidate, score })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uuid::Uuid;

    #[derive(Debug)]
    struct LengthReranker;

    impl Reranker for LengthReranker {
        fn score(&self, _query: &str, candidate: &str) -> Result<f32> {
            Ok(candidate.len() as f32)
        }
        fn name(&self) -> &str {
            "length"
        }
    }

    #[derive(Debug)]
    struct ScriptedReranker(Vec<f32>);

    impl Reranker for ScriptedReranker {
        fn score(&self, _query: &str, _candidate: &str) -> Result<f32> {
            Ok(0.0)
        }
        fn score_batch(&self, _query: &str, _candidates: &[&str]) -> Result<Vec<f32>> {
            Ok(self.0.clone())
        }
        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn candidates(texts: &[&str]) -> Vec<Candidate> {
        texts
            .iter()
            .map(|t| Candidate {
                id: Uuid::new_v4(),
                text: Arc::from(*t),
                dense: None,
                sparse: None,
                fusion_score: None,
            })
            .collect()
    }

    fn texts(ranked: &[Reranked]) -> Vec<&str> {
        ranked.iter().map(|r| &*r.candidate.text).collect()
    }

    #[test]
    fn test_rerank_descending() {
        let ranked = rerank(&LengthReranker, "q", candidates(&["bb", "a", "dddd", "ccc"])).unwrap();
        assert_eq!(texts(&ranked), vec!["dddd", "ccc", "bb", "a"]);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_rerank_ties_keep_input_order() {
        let ranked = rerank(&LengthReranker, "q", candidates(&["xx", "yyy", "zz", "ww"])).unwrap();
        assert_eq!(texts(&ranked), vec!["yyy", "xx", "zz", "ww"]);
    }

    #[test]
    fn test_rerank_rejects_nan() {
        let r = ScriptedReranker(vec![0.5, f32::NAN]);
        assert!(matches!(rerank(&r, "q", candidates(&["a", "b"])), Err(Error::Rerank(_))));
    }

    #[test]
    fn test_rerank_rejects_wrong_score_count() {
        let r = ScriptedReranker(vec![0.5]);
        assert!(matches!(rerank(&r, "q", candidates(&["a", "b"])), Err(Error::Rerank(_))));
    }

    #[test]
    fn test_rerank_empty() {
        assert!(rerank(&LengthReranker, "q", Vec::new()).unwrap().is_empty());
    }
}
