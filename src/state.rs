// src/state.rs
// Shared application state handed to every HTTP handler

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use crate::chat::responder::{Responder, ResponderSettings};
use crate::chat::SessionManager;
use crate::config::ChatbotConfig;
use crate::error::Result;
use crate::llm::{ChatModel, Embedder, OpenAIClient, OpenAiChatModel, OpenAiEmbeddings};
use crate::retrieval::load_retriever;
use crate::storage::{connect_store, InteractionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ChatbotConfig>,
    pub responder: Arc<Responder>,
    pub sessions: Arc<SessionManager>,
    pub store: Arc<dyn InteractionStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ChatbotConfig, responder: Responder, store: Arc<dyn InteractionStore>) -> Self {
        let sessions = responder.sessions().clone();
        Self {
            config: Arc::new(config),
            responder: Arc::new(responder),
            sessions,
            store,
            started_at: Instant::now(),
        }
    }

    /// Wire up the production stack: OpenAI clients, the configured
    /// retriever and the interaction recorder. Fails when any of them is unusable.
    pub async fn initialize(config: ChatbotConfig) -> Result<Self> {
        let client = OpenAIClient::new(&config.openai_api_key, &config.openai_base_url);

        let embedder: Arc<dyn Embedder> =
            Arc::new(OpenAiEmbeddings::new(client.clone(), &config.embedding_model));
        let retriever = load_retriever(&config, embedder).await?;

        let model: Arc<dyn ChatModel> =
            Arc::new(OpenAiChatModel::new(client, &config.model_name, config.temperature));

        let store = connect_store(&config.database_url, config.database_max_connections).await?;

        let sessions = Arc::new(
            SessionManager::new(config.max_stored_turns).with_max_sessions(config.max_sessions),
        );
        let settings = ResponderSettings {
            top_k: config.top_k_results,
            max_history: config.max_history,
        };
        let responder = Responder::new(retriever, model, store.clone(), sessions, settings);

        info!(
            "Chat backend ready (model {}, top_k {}, history window {})",
            config.model_name, config.top_k_results, config.max_history
        );
        Ok(Self::new(config, responder, store))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
