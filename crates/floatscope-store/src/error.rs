//! Vector store error types.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Cannot access {path}: {source}")]
    File { path: PathBuf, source: std::io::Error },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed JSON in {path}: {source}")]
    Json { path: PathBuf, source: serde_json::Error },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unsupported index type '{0}': only flat L2 indexes (IxF2) are supported")]
    UnsupportedIndex(String),

    #[error("Corrupt index: {0}")]
    CorruptIndex(String),

    #[error("Invalid embedding dimension: expected {expected}, got {actual}")]
    InvalidEmbeddingDimension { expected: usize, actual: usize },

    #[error("Store files disagree: {left} has {left_len} entries but {right} has {right_len}")]
    Inconsistent { left: &'static str, left_len: usize, right: &'static str, right_len: usize },

    #[error("Nothing to build: {0}")]
    Empty(String),
}
