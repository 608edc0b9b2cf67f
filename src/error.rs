// src/error.rs
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    /// The overall response deadline elapsed before a reply was produced.
    #[error("the assistant could not produce a reply in time")]
    DeadlineExceeded { elapsed_ms: u64 },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(message) => {
                let body = json!({
                    "error": {
                        "code": "invalid_payload",
                        "message": message,
                    },
                    "accepted_shapes": [
                        {"message": "string"},
                        {"messages": [{"role": "user|assistant|system", "content": "string"}], "response_style": "plain|list|guided"},
                    ],
                });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AppError::DeadlineExceeded { elapsed_ms } => {
                let body = json!({
                    "error": {
                        "code": "timeout",
                        "message": self.to_string(),
                    },
                    "elapsed_ms": elapsed_ms,
                });
                (StatusCode::GATEWAY_TIMEOUT, Json(body)).into_response()
            }
        }
    }
}
