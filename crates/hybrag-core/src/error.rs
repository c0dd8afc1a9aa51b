use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error("Could not extract text from {path}: {reason}")]
    Extraction { path: PathBuf, reason: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Scorer returned {actual} scores for {expected} candidates")]
    ScoreCount { expected: usize, actual: usize },

    #[error("Timed out after {secs}s: {what}")]
    Timeout { what: String, secs: u64 },
}

pub type Result<T> = std::result::Result<T, Error>;
