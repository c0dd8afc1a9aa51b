use std::path::Path;

use crate::types::{Chunk, RetrievalHit, WebResult};

/// Text → fixed-size vector. The same instance must serve ingestion and queries.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Cross-encoder style scorer: one comparable scalar per `(query, candidate)` pair.
pub trait RelevanceScorer: Send + Sync {
    /// Returns exactly one score per candidate, in candidate order. Higher is more relevant.
    fn score(&self, query: &str, candidates: &[&str]) -> anyhow::Result<Vec<f32>>;
}

/// Public search capability backing the web source.
pub trait WebSearcher: Send + Sync {
    fn search(&self, query: &str, max_results: usize) -> anyhow::Result<Vec<WebResult>>;
}

/// Document → per-page text.
pub trait TextExtractor: Send + Sync {
    /// Lowercase file extensions this extractor handles, without the dot.
    fn extensions(&self) -> &[&'static str];
    fn extract_pages(&self, path: &Path) -> anyhow::Result<Vec<String>>;
}

pub trait VectorIndexer: Send + Sync {
    /// Replace the whole persisted collection with `chunks`. Returns the row count.
    fn rebuild(&self, chunks: &[Chunk]) -> anyhow::Result<usize>;
    fn query(&self, text: &str, k: usize, distance_threshold: f32) -> anyhow::Result<Vec<RetrievalHit>>;
}
