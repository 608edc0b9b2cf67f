// src/services/chatbot.rs
use tracing::debug;

use crate::message::{ChatMessage, ResponseStyle};
use crate::services::{fallback, openai};
use crate::state::AppState;

/// Shown when the upstream is configured but errors out or times out.
pub const UPSTREAM_UNAVAILABLE_REPLY: &str = "AI took too long to respond. Please try again.";

/// Produce the assistant reply.
///
/// Takes the upstream path only when an API key is configured; any upstream
/// failure is recovered locally, never propagated. Without a key the reply
/// is computed deterministically.
pub async fn generate_reply(
    state: &AppState,
    messages: &[ChatMessage],
    style: Option<ResponseStyle>,
) -> String {
    if state.settings.openai_is_configured() {
        match openai::request_completion(state, messages, style).await {
            Ok(reply) => return reply,
            Err(err) => {
                debug!(error = %err, "upstream unavailable, using friendly fallback");
                return UPSTREAM_UNAVAILABLE_REPLY.to_string();
            }
        }
    }

    fallback::deterministic_reply(messages, style)
}
