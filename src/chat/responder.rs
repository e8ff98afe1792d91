// src/chat/responder.rs
// Retrieval-augmented answering for one session turn

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info};

use super::categorizer::classify;
use super::history::{ConversationHistory, ConversationTurn, SessionManager};
use super::postprocess::{clean_answer, word_count};
use super::{ERROR_CATEGORY, FALLBACK_REPLY};
use crate::error::{ChatError, Result};
use crate::llm::ChatModel;
use crate::prompt::{join_passages, PromptBuilder};
use crate::retrieval::Retriever;
use crate::storage::{InteractionStore, NewInteraction};

/// Result of one `respond` call. Failures are values, not errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    Answered { answer: String, message_id: i64 },
    Failed { reason: String, message_id: Option<i64> },
}

impl ChatOutcome {
    /// Text to show the user: the answer, or the apology
    pub fn reply(&self) -> &str {
        match self {
            ChatOutcome::Answered { answer, .. } => answer,
            ChatOutcome::Failed { .. } => FALLBACK_REPLY,
        }
    }

    /// Id of the recorded interaction, if recording succeeded
    pub fn message_id(&self) -> Option<i64> {
        match self {
            ChatOutcome::Answered { message_id, .. } => Some(*message_id),
            ChatOutcome::Failed { message_id, .. } => *message_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ChatOutcome::Failed { .. })
    }
}

/// Outcome of one turn plus the session history as it stood when the turn ended
#[derive(Debug, Clone, PartialEq)]
pub struct ChatExchange {
    pub outcome: ChatOutcome,
    pub history: Vec<ConversationTurn>,
}

/// Tunables for the responder
#[derive(Debug, Clone, Copy)]
pub struct ResponderSettings {
    /// Passages retrieved per question
    pub top_k: usize,
    /// Turns of history rendered into the prompt
    pub max_history: usize,
}

impl Default for ResponderSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_history: 4,
        }
    }
}

pub struct Responder {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn ChatModel>,
    store: Arc<dyn InteractionStore>,
    sessions: Arc<SessionManager>,
    prompt: PromptBuilder,
    settings: ResponderSettings,
}

impl Responder {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        model: Arc<dyn ChatModel>,
        store: Arc<dyn InteractionStore>,
        sessions: Arc<SessionManager>,
        settings: ResponderSettings,
    ) -> Self {
        Self {
            retriever,
            model,
            store,
            sessions,
            prompt: PromptBuilder::default(),
            settings,
        }
    }

    pub fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn settings(&self) -> ResponderSettings {
        self.settings
    }

    /// Answer `question` within `session_id`.
    ///
    /// The session stays locked for the whole cycle, so turns of one session
    /// never interleave. Every call records exactly one interaction row
    /// (unless the store itself fails) and never returns an error.
    pub async fn respond(&self, question: &str, session_id: &str) -> ChatOutcome {
        self.exchange(question, session_id).await.outcome
    }

    /// Like `respond`, also returning the history snapshot taken before the
    /// session lock is released.
    pub async fn exchange(&self, question: &str, session_id: &str) -> ChatExchange {
        let handle = self.sessions.session(session_id).await;
        let mut history = handle.lock().await;
        let outcome = self.respond_locked(&mut history, question, session_id).await;
        ChatExchange {
            outcome,
            history: history.turns(),
        }
    }

    async fn respond_locked(
        &self,
        history: &mut ConversationHistory,
        question: &str,
        session_id: &str,
    ) -> ChatOutcome {
        let started = Instant::now();
        history.push(ConversationTurn::user(question));
        let transcript = history.transcript(self.settings.max_history);

        match self.answer(question, session_id, &transcript, started).await {
            Ok((answer, message_id)) => {
                history.push(ConversationTurn::assistant(answer.clone()));
                info!(
                    session_id,
                    message_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Answered question"
                );
                ChatOutcome::Answered { answer, message_id }
            }
            Err(e) => {
                error!(session_id, "Failed to answer question: {}", e);
                let message_id = self.record_failure(question, session_id, started).await;
                ChatOutcome::Failed {
                    reason: e.to_string(),
                    message_id,
                }
            }
        }
    }

    async fn answer(
        &self,
        question: &str,
        session_id: &str,
        transcript: &str,
        started: Instant,
    ) -> Result<(String, i64)> {
        let passages = self.retriever.retrieve(question, self.settings.top_k).await?;
        debug!("Retrieved {} passages", passages.len());

        let contents: Vec<&str> = passages.iter().map(|p| p.content.as_str()).collect();
        let prompt = self.prompt.render(transcript, &join_passages(&contents), question);

        let raw = self.model.complete(&prompt).await?;
        let answer = clean_answer(&raw);
        if answer.is_empty() {
            return Err(ChatError::EmptyAnswer);
        }

        let interaction = NewInteraction {
            session_id: session_id.to_string(),
            timestamp: Utc::now(),
            user_message: question.to_string(),
            bot_response: answer.clone(),
            response_time: started.elapsed().as_secs_f64(),
            category: classify(question).to_string(),
            tokens_used: word_count(&raw) as i64,
            error_occurred: false,
        };
        let message_id = self.store.save(&interaction).await?;

        Ok((answer, message_id))
    }

    async fn record_failure(&self, question: &str, session_id: &str, started: Instant) -> Option<i64> {
        let interaction = NewInteraction {
            session_id: session_id.to_string(),
            timestamp: Utc::now(),
            user_message: question.to_string(),
            bot_response: FALLBACK_REPLY.to_string(),
            response_time: started.elapsed().as_secs_f64(),
            category: ERROR_CATEGORY.to_string(),
            tokens_used: 0,
            error_occurred: true,
        };
        match self.store.save(&interaction).await {
            Ok(id) => Some(id),
            Err(e) => {
                error!(session_id, "Failed to record error interaction: {}", e);
                None
            }
        }
    }
}
