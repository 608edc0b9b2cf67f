use copilot_backend::config::Settings;
use copilot_backend::message::ChatResponse;
use copilot_backend::routes::create_router;
use copilot_backend::services::chatbot::UPSTREAM_UNAVAILABLE_REPLY;
use copilot_backend::state::AppState;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tower::util::ServiceExt;

fn app_with(settings: Settings) -> Router {
    let state = Arc::new(AppState::new(settings));
    create_router().with_state(state)
}

fn chat_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Accepts connections, drains the request, and never responds.
async fn hanging_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
            });
        }
    });
    format!("http://{addr}/v1/chat/completions")
}

/// Minimal HTTP responder returning a fixed chat-completion body.
async fn mock_upstream(reply_body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut tmp = [0u8; 1024];
                loop {
                    let n = match socket.read(&mut tmp).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => n,
                    };
                    buf.extend_from_slice(&tmp[..n]);
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        let headers = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
                        let content_length = headers
                            .lines()
                            .find_map(|l| l.strip_prefix("content-length:"))
                            .and_then(|v| v.trim().parse::<usize>().ok())
                            .unwrap_or(0);
                        if buf.len() - (pos + 4) >= content_length {
                            break;
                        }
                    }
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    reply_body.len(),
                    reply_body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });
    format!("http://{addr}/v1/chat/completions")
}

#[tokio::test]
async fn test_health_check() {
    let app = app_with(Settings::default());
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Healthy");
}

#[tokio::test]
async fn test_minimal_shape_without_key_is_deterministic() {
    let app = app_with(Settings::default());

    let mut replies = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(chat_request(r#"{"message": "Give me examples of vegetables"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let chat: ChatResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!chat.reply.is_empty());
        replies.push(chat.reply);
    }
    assert_eq!(replies[0], replies[1]);
}

#[tokio::test]
async fn test_rich_shape_with_list_style() {
    let app = app_with(Settings::default());
    let response = app
        .oneshot(chat_request(
            r#"{"messages": [{"role": "user", "content": "name some vegetables"}], "response_style": "list"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let reply = json["reply"].as_str().unwrap();
    assert!(reply.starts_with("- Carrots"), "got: {reply}");
}

#[tokio::test]
async fn test_empty_object_returns_invalid_payload() {
    let app = app_with(Settings::default());
    let response = app.oneshot(chat_request("{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "invalid_payload");
    assert!(json["accepted_shapes"].is_array());
}

#[tokio::test]
async fn test_blank_message_returns_invalid_payload() {
    let app = app_with(Settings::default());
    let response = app
        .oneshot(chat_request(r#"{"message": "   "}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "invalid_payload");
}

#[tokio::test]
async fn test_malformed_body_is_client_error() {
    let app = app_with(Settings::default());
    let response = app.oneshot(chat_request("not json")).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_invalid_role_is_client_error() {
    let app = app_with(Settings::default());
    let response = app
        .oneshot(chat_request(
            r#"{"messages": [{"role": "invalid", "content": "hi"}]}"#,
        ))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_upstream_success_returns_completion() {
    let base_url = mock_upstream(
        r#"{"choices": [{"message": {"role": "assistant", "content": "Paris."}}]}"#,
    )
    .await;
    let app = app_with(Settings {
        openai_api_key: Some("sk-test".to_string()),
        openai_base_url: base_url,
        call_timeout: Duration::from_secs(2),
        overall_deadline: Duration::from_secs(5),
        ..Settings::default()
    });

    let response = app
        .oneshot(chat_request(r#"{"message": "Capital of France?"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["reply"], "Paris.");
}

#[tokio::test]
async fn test_hanging_upstream_falls_back_within_budget() {
    let base_url = hanging_upstream().await;
    let app = app_with(Settings {
        openai_api_key: Some("sk-test".to_string()),
        openai_base_url: base_url,
        call_timeout: Duration::from_millis(200),
        overall_deadline: Duration::from_secs(5),
        ..Settings::default()
    });

    let started = Instant::now();
    let response = app
        .oneshot(chat_request(r#"{"message": "hello"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    // One retry: two bounded attempts, well inside the overall budget.
    assert!(started.elapsed() < Duration::from_secs(5));
    let json = body_json(response).await;
    assert_eq!(json["reply"], UPSTREAM_UNAVAILABLE_REPLY);
}

#[tokio::test]
async fn test_overall_deadline_yields_structured_timeout() {
    let base_url = hanging_upstream().await;
    let app = app_with(Settings {
        openai_api_key: Some("sk-test".to_string()),
        openai_base_url: base_url,
        call_timeout: Duration::from_secs(10),
        overall_deadline: Duration::from_millis(300),
        ..Settings::default()
    });

    let started = Instant::now();
    let response = app
        .oneshot(chat_request(r#"{"message": "hello"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(started.elapsed() < Duration::from_secs(5));
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "timeout");
    assert!(json["elapsed_ms"].is_u64());
}
