//! Token-overlap reranker.
//!
//! Scores a pair by the Dice coefficient of the two token sets, using the same
//! tokenizer as the lexical embedder. Deterministic stand-in for a
//! cross-encoder; scores fall in [0, 1].

use super::Reranker;
use crate::embedding::tokenize;
use crate::error::Result;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalReranker;

impl LexicalReranker {
    pub fn new() -> Self {
        Self
    }
}

fn dice(q: &HashSet<&str>, c: &HashSet<&str>) -> f32 {
    if q.is_empty() || c.is_empty() {
        return 0.0;
    }
    let shared = q.intersection(c).count();
    2.0 * shared as f32 / (q.len() + c.len()) as f32
}

impl Reranker for LexicalReranker {
    fn score(&self, query: &str, candidate: &str) -> Result<f32> {
        let (q, c) = (tokenize(query), tokenize(candidate));
        Ok(dice(&q.unique(), &c.unique()))
    }

    fn score_batch(&self, query: &str, candidates: &[&str]) -> Result<Vec<f32>> {
        let q_tokens = tokenize(query);
        let q = q_tokens.unique();
        Ok(candidates
            .iter()
            .map(|text| dice(&q, &tokenize(text).unique()))
            .collect())
    }

    fn name(&self) -> &str {
        "lexical"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_text_scores_one() {
        let r = LexicalReranker::new();
        assert_eq!(r.score("What is BM25?", "what is bm25").unwrap(), 1.0);
    }

    #[test]
    fn test_partial_overlap() {
        let r = LexicalReranker::new();
        // {what, bm, 25} vs {definition, bm, 25}: 2*2 / 6
        let s = r.score("What is BM25?", "Definition of BM25").unwrap();
        assert!((s - 2.0 / 3.0).abs() < 1e-6, "score = {}", s);
    }

    #[test]
    fn test_no_tokens_scores_zero() {
        let r = LexicalReranker::new();
        assert_eq!(r.score("the of", "anything here").unwrap(), 0.0);
        assert_eq!(r.score("vectors", "").unwrap(), 0.0);
    }

    #[test]
    fn test_batch_matches_single() {
        let r = LexicalReranker::new();
        let docs = ["sparse vectors", "dense vectors", "cooking pasta"];
        let batch = r.score_batch("sparse vector search", &docs).unwrap();
        for (doc, score) in docs.iter().zip(&batch) {
            assert_eq!(*score, r.score("sparse vector search", doc).unwrap());
        }
    }
}
