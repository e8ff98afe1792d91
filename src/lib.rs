// src/lib.rs
// Retrieval-augmented chat backend for the hokejlogic.cz navigation assistant

pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod persona;
pub mod prompt;
pub mod retrieval;
pub mod state;
pub mod storage;

pub use config::ChatbotConfig;
pub use error::{ChatError, Result};
pub use state::AppState;
