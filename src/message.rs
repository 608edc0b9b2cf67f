// src/message.rs
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Per-message content cap, matching the documented request contract.
pub const MAX_INPUT_CHARS: usize = 5000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStyle {
    Plain,
    List,
    Guided,
}

/// Inbound chat payload. Two shapes are accepted: the minimal
/// `{"message": "..."}` and the rich `{"messages": [...], "response_style": ...}`.
/// `stream` is accepted and ignored (placeholder, not implemented).
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
    pub messages: Option<Vec<ChatMessage>>,
    pub response_style: Option<ResponseStyle>,
    #[serde(default)]
    pub stream: bool,
}

impl ChatRequest {
    /// Normalize both accepted shapes into a non-empty message list.
    ///
    /// The rich shape wins when it carries any messages; otherwise a
    /// non-blank `message` becomes a single user message. Anything else
    /// is an invalid payload.
    pub fn into_messages(self) -> Result<(Vec<ChatMessage>, Option<ResponseStyle>), AppError> {
        if let Some(messages) = self.messages {
            if !messages.is_empty() {
                for msg in &messages {
                    let content = msg.content.trim();
                    if content.is_empty() {
                        return Err(AppError::BadRequest(
                            "message content must not be empty".to_string(),
                        ));
                    }
                    if content.chars().count() > MAX_INPUT_CHARS {
                        return Err(AppError::BadRequest(format!(
                            "message content exceeds {MAX_INPUT_CHARS} characters"
                        )));
                    }
                }
                return Ok((messages, self.response_style));
            }
        }

        match self.message {
            Some(text) if !text.trim().is_empty() => {
                if text.trim().chars().count() > MAX_INPUT_CHARS {
                    return Err(AppError::BadRequest(format!(
                        "message exceeds {MAX_INPUT_CHARS} characters"
                    )));
                }
                Ok((vec![ChatMessage::user(text)], self.response_style))
            }
            _ => Err(AppError::BadRequest(
                "provide either a non-empty 'message' or a non-empty 'messages' array".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}
