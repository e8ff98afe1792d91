// src/prompt/mod.rs
// Prompt rendering for the responder

pub mod builder;

pub use builder::{join_passages, PromptBuilder, RenderedPrompt};
