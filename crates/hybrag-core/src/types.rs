//! Domain types shared by the chunker, the three retrieval sources and the reranker.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Positional identity of a corpus chunk within one ingestion run.
///
/// Ids are reassigned from zero on every run; an id is only meaningful
/// together with the epoch that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkId(pub usize);

impl ChunkId {
    /// Key used for the persisted vector row.
    pub fn storage_key(self) -> String {
        format!("chunk_{}", self.0)
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk_{}", self.0)
    }
}

/// Where a piece of evidence came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Corpus,
    Web,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Corpus => "corpus",
            SourceKind::Web => "web",
        }
    }
}

/// Metadata carried by every chunk and every hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMeta {
    pub filename: String,
    pub source_kind: SourceKind,
}

impl ChunkMeta {
    pub fn corpus(filename: impl Into<String>) -> Self {
        Self { filename: filename.into(), source_kind: SourceKind::Corpus }
    }

    pub fn web(filename: impl Into<String>) -> Self {
        Self { filename: filename.into(), source_kind: SourceKind::Web }
    }
}

/// A bounded text span cut from one document.
///
/// - `id`: position within the ingestion run
/// - `offset`: character offset of the span inside its document
/// - `text`: the raw window, untrimmed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub offset: usize,
    pub text: String,
    pub meta: ChunkMeta,
}

/// Raw score attached by a retrieval source.
///
/// Scores of different variants live on unrelated scales and must never be
/// compared with each other. Only the reranker produces comparable values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SourceScore {
    /// Vector distance, lower is closer.
    Distance(f32),
    /// BM25 score, higher is better.
    Lexical(f32),
    Unscored,
}

/// One candidate returned by a retrieval source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalHit {
    pub text: String,
    pub meta: ChunkMeta,
    pub source_score: SourceScore,
}

impl RetrievalHit {
    pub fn from_chunk(chunk: &Chunk, source_score: SourceScore) -> Self {
        Self { text: chunk.text.clone(), meta: chunk.meta.clone(), source_score }
    }
}

/// A candidate after fusion, ordered by `relevance` (higher is better).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankedHit {
    pub text: String,
    pub meta: ChunkMeta,
    pub relevance: f32,
}

/// One organic result of a web search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}
