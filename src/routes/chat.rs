// src/routes/chat.rs
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::error::AppError;
use crate::message::{ChatRequest, ChatResponse};
use crate::services::chatbot::generate_reply;
use crate::state::SharedState;

/// POST /api/chat
///
/// Validates the payload and produces a reply under the overall deadline.
/// Deadline exhaustion surfaces as a structured timeout error instead of
/// a hanging request.
pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let started = Instant::now();
    let (messages, style) = payload.into_messages()?;

    let deadline = state.settings.overall_deadline;
    match tokio::time::timeout(deadline, generate_reply(&state, &messages, style)).await {
        Ok(reply) => Ok(Json(ChatResponse { reply })),
        Err(_) => {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            warn!(elapsed_ms, "chat request hit the overall deadline");
            Err(AppError::DeadlineExceeded { elapsed_ms })
        }
    }
}
