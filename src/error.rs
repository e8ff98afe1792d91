// src/error.rs
// Error types for the chat backend

use thiserror::Error;

use crate::retrieval::VectorStoreError;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("model returned an empty answer")]
    EmptyAnswer,

    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Convenience type alias for Result using ChatError
pub type Result<T> = std::result::Result<T, ChatError>;
