use anyhow::Result;
use std::collections::HashSet;
use tracing::debug;

use hybrag_core::error::Error;
use hybrag_core::traits::RelevanceScorer;
use hybrag_core::types::{RerankedHit, RetrievalHit};

/// Score every `(query, hit)` pair with `scorer` and keep the best `top_n`.
///
/// Source scores are dropped. Equal scores keep input order; NaN ranks last.
pub fn rerank(scorer: &dyn RelevanceScorer, query: &str, hits: Vec<RetrievalHit>, top_n: usize) -> Result<Vec<RerankedHit>> {
    if hits.is_empty() { return Ok(vec![]); }
    let texts: Vec<&str> = hits.iter().map(|h| h.text.as_str()).collect();
    let scores = scorer.score(query, &texts)?;
    if scores.len() != hits.len() {
        return Err(Error::ScoreCount { expected: hits.len(), actual: scores.len() }.into());
    }

    let mut reranked: Vec<RerankedHit> = hits
        .into_iter()
        .zip(scores)
        .map(|(h, s)| RerankedHit { text: h.text, meta: h.meta, relevance: if s.is_nan() { f32::NEG_INFINITY } else { s } })
        .collect();
    let candidates = reranked.len();
    reranked.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    reranked.truncate(top_n);
    debug!(candidates, kept = reranked.len(), "reranked");
    Ok(reranked)
}

/// Drop hits whose text already appeared earlier in the list.
pub fn dedup_by_text(hits: Vec<RetrievalHit>) -> Vec<RetrievalHit> {
    let mut seen = HashSet::new();
    hits.into_iter().filter(|h| seen.insert(h.text.clone())).collect()
}

pub fn assemble_context(hits: &[RerankedHit]) -> String {
    hits.iter().map(|h| h.text.as_str()).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use hybrag_core::types::{ChunkMeta, SourceScore};

    fn hit(text: &str) -> RetrievalHit {
        RetrievalHit { text: text.to_string(), meta: ChunkMeta::corpus("a.txt"), source_score: SourceScore::Unscored }
    }

    #[test]
    fn context_joins_with_newlines() {
        let hits = vec![
            RerankedHit { text: "first".into(), meta: ChunkMeta::corpus("a.txt"), relevance: 1.0 },
            RerankedHit { text: "second".into(), meta: ChunkMeta::web("duckduckgo"), relevance: 0.5 },
        ];
        assert_eq!(assemble_context(&hits), "first\nsecond");
        assert_eq!(assemble_context(&[]), "");
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let out = dedup_by_text(vec![hit("a"), hit("b"), hit("a")]);
        assert_eq!(out.iter().map(|h| h.text.as_str()).collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
