// src/retrieval/error.rs
//! Errors raised while loading or querying the similarity index.
//!
//! Every variant is fatal at startup; at request time they surface through
//! `ChatError::VectorStore` and end in the fallback reply.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    /// Index file does not exist
    #[error("index not found at path: {0}")]
    NotFound(String),

    /// Index file exists but could not be read
    #[error("failed to read index {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// Index file is not valid JSON or has the wrong shape
    #[error("failed to parse index {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    /// Index holds no passages
    #[error("index at {0} contains no passages")]
    Empty(String),

    /// A passage vector has the wrong length
    #[error("dimension mismatch in passage {id}: expected {expected}D, got {actual}D")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    /// A passage vector contains NaN or infinity
    #[error("passage {0} contains non-finite embedding values")]
    NonFiniteValues(String),

    /// Embedding backend produced vectors that do not fit the index
    #[error("embedding model returns {actual}D vectors but the index holds {expected}D vectors")]
    EmbedderMismatch { expected: usize, actual: usize },

    /// Failed to write a freshly built index
    #[error("failed to write index {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    /// Qdrant collection is missing
    #[error("qdrant collection not found: {0}")]
    CollectionMissing(String),

    /// Any other Qdrant client failure
    #[error("qdrant error: {0}")]
    Qdrant(String),
}
