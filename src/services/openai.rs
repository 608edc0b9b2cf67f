// src/services/openai.rs
//
// Non-streaming call to the OpenAI Chat Completions API with a bounded
// per-call timeout and a single retry on transient failure. Every failure
// becomes a typed error for the caller to convert into the fallback path.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::message::{ChatMessage, ResponseStyle, Role};
use crate::state::AppState;

/// Final safeguard on reply length.
pub const MAX_RESPONSE_CHARS: usize = 4000;

const SYSTEM_PROMPT_BASE: &str =
    "You are a concise, helpful assistant. Answer clearly and directly.";
const SYSTEM_PROMPT_LIST_HINT: &str =
    "If the user wants examples or items, use a short list without preamble.";
const SYSTEM_PROMPT_GUIDED_HINT: &str =
    "If the user asks for steps/how-to, provide brief, numbered steps; otherwise answer plainly.";

/// Recent-history window included in the upstream prompt.
const MAX_CONTEXT_MESSAGES: usize = 3;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("no OpenAI API key configured")]
    NotConfigured,
    #[error("upstream call timed out after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },
    #[error("upstream returned status {status}")]
    Status { status: u16 },
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("upstream returned no usable completion")]
    EmptyCompletion,
}

impl UpstreamError {
    /// Timeouts, connection problems, 429 and 5xx are worth one retry.
    fn is_transient(&self) -> bool {
        match self {
            UpstreamError::Timeout { .. } => true,
            UpstreamError::Status { status } => *status == 429 || *status >= 500,
            UpstreamError::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

fn role_str(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::System => "system",
    }
}

fn last_user_content(messages: &[ChatMessage]) -> Option<String> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Build the wire messages: system prompt, a tiny recent-history window,
/// and the latest user message guaranteed last.
pub fn build_wire_messages(
    messages: &[ChatMessage],
    style: Option<ResponseStyle>,
) -> Vec<WireMessage> {
    let mut system_prompt = SYSTEM_PROMPT_BASE.to_string();
    match style {
        Some(ResponseStyle::List) => {
            system_prompt.push(' ');
            system_prompt.push_str(SYSTEM_PROMPT_LIST_HINT);
        }
        Some(ResponseStyle::Guided) => {
            system_prompt.push(' ');
            system_prompt.push_str(SYSTEM_PROMPT_GUIDED_HINT);
        }
        _ => {}
    }

    let mut wire = vec![WireMessage {
        role: "system".to_string(),
        content: system_prompt,
    }];

    let recent: Vec<&ChatMessage> = messages
        .iter()
        .rev()
        .filter(|m| !m.content.trim().is_empty())
        .take(MAX_CONTEXT_MESSAGES)
        .collect();
    for msg in recent.into_iter().rev() {
        wire.push(WireMessage {
            role: role_str(msg.role).to_string(),
            content: msg.content.trim().to_string(),
        });
    }

    if let Some(last_user) = last_user_content(messages) {
        let already_last = wire
            .last()
            .is_some_and(|m| m.role == "user" && m.content == last_user);
        if !already_last {
            wire.push(WireMessage {
                role: "user".to_string(),
                content: last_user,
            });
        }
    }

    wire
}

pub fn build_payload(
    model: &str,
    messages: &[ChatMessage],
    style: Option<ResponseStyle>,
) -> CompletionRequest {
    CompletionRequest {
        model: model.to_string(),
        messages: build_wire_messages(messages, style),
        // Keep generation near-deterministic.
        temperature: 0.2,
        top_p: 1.0,
        max_tokens: 400,
    }
}

/// Request a completion from the upstream API.
///
/// Issues at most two attempts (one retry on transient failure), each
/// bounded by the configured per-call timeout.
pub async fn request_completion(
    state: &AppState,
    messages: &[ChatMessage],
    style: Option<ResponseStyle>,
) -> Result<String, UpstreamError> {
    let api_key = state
        .settings
        .openai_api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or(UpstreamError::NotConfigured)?;

    let payload = build_payload(&state.settings.openai_model, messages, style);

    let mut attempt = 0;
    loop {
        let started = Instant::now();
        match call_once(state, api_key, &payload).await {
            Ok(reply) => {
                info!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    attempt, "openai call completed"
                );
                return Ok(reply);
            }
            Err(err) if err.is_transient() && attempt == 0 => {
                warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "openai call failed, retrying once"
                );
                attempt += 1;
            }
            Err(err) => {
                warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "openai call failed"
                );
                return Err(err);
            }
        }
    }
}

async fn call_once(
    state: &AppState,
    api_key: &str,
    payload: &CompletionRequest,
) -> Result<String, UpstreamError> {
    let started = Instant::now();

    let send = state
        .http
        .post(&state.settings.openai_base_url)
        .bearer_auth(api_key)
        .json(payload)
        .send();

    // The reqwest client carries its own timeout; this is the guardrail
    // in case the transfer stalls mid-body.
    let response = match tokio::time::timeout(state.settings.call_timeout, send).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(UpstreamError::Timeout {
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        }
    };

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status: status.as_u16(),
        });
    }

    let data: CompletionResponse = response.json().await?;
    let content = data
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(UpstreamError::EmptyCompletion)?;

    if content.chars().count() > MAX_RESPONSE_CHARS {
        let truncated: String = content.chars().take(MAX_RESPONSE_CHARS).collect();
        return Ok(truncated.trim_end().to_string());
    }
    Ok(content)
}
