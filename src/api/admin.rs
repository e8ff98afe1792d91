// src/api/admin.rs
// Admin-only endpoints, gated by the X-API-Key header

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use tracing::warn;

use super::chat::ClearResponse;
use super::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::storage::InteractionStats;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Conversations listed when the caller gives no limit
pub const DEFAULT_CONVERSATION_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub limit: Option<usize>,
}

/// Missing key is 401, a wrong one 403
pub fn verify_admin_key(headers: &HeaderMap, expected: &str) -> ApiResult<()> {
    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    match provided {
        None => Err(ApiError::unauthorized("API key required")),
        Some(key) if key == expected => Ok(()),
        Some(_) => {
            warn!("Rejected admin request with invalid API key");
            Err(ApiError::forbidden("Invalid API key"))
        }
    }
}

/// GET /stats
pub async fn stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> ApiResult<Json<InteractionStats>> {
    verify_admin_key(&headers, &state.config.admin_api_key)?;
    let Query(query) = query?;

    let limit = query.limit.unwrap_or(DEFAULT_CONVERSATION_LIMIT);
    let stats = state.store.stats(limit).await?;
    Ok(Json(stats))
}

/// POST /admin/clear
///
/// Drops every session's history.
pub async fn clear_all_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<ClearResponse>> {
    verify_admin_key(&headers, &state.config.admin_api_key)?;
    state.sessions.clear_all().await;
    Ok(Json(ClearResponse::cleared()))
}
