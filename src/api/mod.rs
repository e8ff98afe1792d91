// src/api/mod.rs
// HTTP surface: routes, CORS and request tracing

pub mod admin;
pub mod chat;
pub mod error;
pub mod health;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

pub use error::{ApiError, ApiResult};

/// Build the router with every endpoint
pub fn http_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/chat", post(chat::chat_handler))
        .route("/clear", post(chat::clear_handler))
        .route("/history", get(chat::history_handler))
        .route("/rate", post(chat::rate_handler))
        .route("/stats", get(admin::stats_handler))
        .route("/admin/clear", post(admin::clear_all_handler))
        .route("/health", get(health::health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Listed origins with credentials, or any origin without them when `*` is configured
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(methods)
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(admin::API_KEY_HEADER),
        ])
        .allow_credentials(true)
}
