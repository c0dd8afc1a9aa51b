//! hybrag-text
//!
//! Tantivy-based lexical retrieval: an in-RAM BM25 index rebuilt wholesale
//! for every ingestion epoch.

pub mod tantivy_utils;
pub mod index;

pub use index::LexicalIndex;
