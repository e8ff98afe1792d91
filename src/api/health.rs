// src/api/health.rs

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::config::VERSION;
use crate::state::AppState;

/// GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": VERSION,
        "uptime_seconds": state.uptime_seconds()
    }))
}
