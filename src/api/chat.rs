// src/api/chat.rs
// Public chat endpoints: ask, clear, history, rate

use axum::{
    body::Bytes,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::{ApiError, ApiResult};
use crate::chat::ConversationTurn;
use crate::state::AppState;
use crate::storage::is_valid_rating;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_history: Vec<ConversationTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub status: bool,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub conversation_history: Vec<ConversationTurn>,
}

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub message_id: i64,
    pub rating: i64,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub response_message: String,
    pub message_id: i64,
    pub rating: i64,
}

/// POST /chat
///
/// Always 200 once the body parses: a failed answer still carries the apology.
pub async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatResponse>> {
    let Json(request) = payload?;
    let session_id = state.sessions.resolve(request.session_id.as_deref());
    info!(session_id = %session_id, "Chat request: {}", preview(&request.message));

    let exchange = state.responder.exchange(&request.message, &session_id).await;

    Ok(Json(ChatResponse {
        response: exchange.outcome.reply().to_string(),
        conversation_history: exchange.history,
        message_id: exchange.outcome.message_id(),
    }))
}

/// First 50 characters of a user message, for logs
fn preview(message: &str) -> String {
    const PREVIEW_CHARS: usize = 50;
    if message.chars().count() <= PREVIEW_CHARS {
        message.to_string()
    } else {
        let head: String = message.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", head)
    }
}

/// POST /clear
///
/// `session_id` comes from the query string or an optional JSON body; without
/// one the default session is cleared. Other sessions are never touched.
pub async fn clear_handler(
    State(state): State<AppState>,
    query: Result<Query<SessionQuery>, QueryRejection>,
    body: Bytes,
) -> ApiResult<Json<ClearResponse>> {
    let Query(query) = query?;
    let requested = match query.session_id {
        Some(id) if !id.trim().is_empty() => Some(id),
        _ => body_session_id(&body)?,
    };

    let session_id = state.sessions.resolve(requested.as_deref());
    state.sessions.clear(&session_id).await;

    Ok(Json(ClearResponse::cleared()))
}

impl ClearResponse {
    pub fn cleared() -> Self {
        Self {
            message: "Conversation history cleared".to_string(),
            status: true,
        }
    }
}

// An empty body is fine; anything else must be `{"session_id": ...}`.
fn body_session_id(body: &[u8]) -> ApiResult<Option<String>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let parsed: SessionQuery = serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid clear request body: {}", e)))?;
    Ok(parsed.session_id)
}

/// GET /history
pub async fn history_handler(
    State(state): State<AppState>,
    query: Result<Query<SessionQuery>, QueryRejection>,
) -> ApiResult<Json<HistoryResponse>> {
    let Query(query) = query?;
    let session_id = state.sessions.resolve(query.session_id.as_deref());
    let conversation_history = state.sessions.history(&session_id).await;

    Ok(Json(HistoryResponse {
        session_id,
        conversation_history,
    }))
}

/// POST /rate
pub async fn rate_handler(
    State(state): State<AppState>,
    payload: Result<Json<RateRequest>, JsonRejection>,
) -> ApiResult<Json<RateResponse>> {
    let Json(request) = payload?;
    if !is_valid_rating(request.rating) {
        return Err(ApiError::bad_request("Rating must be -1, 0 or 1"));
    }

    if !state.store.rate(request.message_id, request.rating).await? {
        return Err(ApiError::not_found(format!(
            "Message {} not found",
            request.message_id
        )));
    }

    info!("Interaction {} rated {}", request.message_id, request.rating);
    Ok(Json(RateResponse {
        response_message: "Rating saved".to_string(),
        message_id: request.message_id,
        rating: request.rating,
    }))
}
