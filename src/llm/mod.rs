// src/llm/mod.rs
// OpenAI-compatible clients for chat completions and embeddings

pub mod chat;
pub mod client;
pub mod embeddings;

use serde::{Deserialize, Serialize};

pub use chat::{ChatModel, OpenAiChatModel};
pub use client::OpenAIClient;
pub use embeddings::{Embedder, OpenAiEmbeddings};

/// A single chat message in OpenAI wire format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}
