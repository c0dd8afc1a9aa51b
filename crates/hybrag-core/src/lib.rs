//! hybrag-core
//!
//! Shared domain types, capability traits, configuration and the ingestion
//! front half (extraction + chunking) of the hybrid retrieval pipeline.

pub mod chunker;
pub mod config;
pub mod data_processor;
pub mod error;
pub mod extract;
pub mod logging;
pub mod traits;
pub mod types;
