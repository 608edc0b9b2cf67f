// src/routes/mod.rs
pub mod chat;

use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::SharedState;
use chat::chat_handler;

pub fn create_router() -> Router<SharedState> {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/", get(health_check))
        .layer(TraceLayer::new_for_http())
}

/// CORS layer allowing the configured frontend origin.
///
/// Falls back to a permissive layer when the origin fails to parse as a
/// header value rather than refusing to start.
pub fn cors_layer(frontend_origin: &str) -> CorsLayer {
    match frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(_) => CorsLayer::very_permissive(),
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "message": "Healthy" }))
}
