//! hybrag-hybrid
//!
//! Retrieval orchestration: fan out to the vector, lexical and web sources,
//! fuse by concatenation, rerank with one cross-encoder and assemble the
//! context handed to answer generation.

pub mod fusion;
pub mod retriever;

pub use fusion::{assemble_context, dedup_by_text, rerank};
pub use retriever::{CorpusSnapshot, HybridRetriever, IngestReport, RetrievalOutput, RetrievalParams};
