use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use brightminds_core::gateway::{
    ClaudeClient, GenerationParams, OllamaClient, OpenAIClient, ProxyClient,
};
use brightminds_core::prompt::fallback;
use brightminds_core::{
    AssistantError, ChatSession, CompletionGateway, FailureKind, Message, ProviderId, Settings,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Captured = Arc<Mutex<Option<(HeaderMap, Value)>>>;

/// Serve `router` on an ephemeral local port and return its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A server that records the request on `path` and answers with `status` / `body`.
async fn fixture(path: &str, status: StatusCode, body: Value) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(None));
    let slot = captured.clone();
    let router = Router::new().route(
        path,
        post(move |headers: HeaderMap, Json(request): Json<Value>| {
            let slot = slot.clone();
            let body = body.clone();
            async move {
                *slot.lock().unwrap() = Some((headers, request));
                (status, Json(body))
            }
        }),
    );
    (serve(router).await, captured)
}

fn history() -> Vec<Message> {
    vec![
        Message::user("Hello"),
        Message::assistant("Hi! How can I help?"),
    ]
}

fn taken(captured: &Captured) -> (HeaderMap, Value) {
    captured.lock().unwrap().take().expect("request was not received")
}

// ========================================================================
// OpenAI
// ========================================================================

#[tokio::test]
async fn test_openai_request_shape_and_reply() {
    let (base, captured) = fixture(
        "/v1/chat/completions",
        StatusCode::OK,
        json!({"choices": [{"message": {"role": "assistant", "content": "  We open at 8am.  "}}]}),
    )
    .await;

    let client = OpenAIClient::new("test-key", "SYSTEM TEXT")
        .with_base_url(format!("{base}/"))
        .with_model("gpt-test")
        .with_params(GenerationParams {
            max_tokens: 300,
            temperature: 0.5,
        });
    let reply = client.complete(&history(), "When do you open?").await.unwrap();
    assert_eq!(reply, "We open at 8am.");

    let (headers, body) = taken(&captured);
    assert_eq!(headers["authorization"], "Bearer test-key");
    assert_eq!(body["model"], "gpt-test");
    assert_eq!(body["max_tokens"], 300);
    assert_eq!(body["temperature"].as_f64(), Some(0.5));

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0], json!({"role": "system", "content": "SYSTEM TEXT"}));
    assert_eq!(messages[1], json!({"role": "user", "content": "Hello"}));
    assert_eq!(messages[2]["role"], "assistant");
    assert_eq!(messages[3], json!({"role": "user", "content": "When do you open?"}));
}

#[tokio::test]
async fn test_openai_missing_content_is_empty_reply() {
    let (base, _) = fixture(
        "/v1/chat/completions",
        StatusCode::OK,
        json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
    )
    .await;
    let client = OpenAIClient::new("k", "s").with_base_url(base);
    assert_eq!(client.complete(&[], "hi").await.unwrap(), "");

    let (base, _) = fixture("/v1/chat/completions", StatusCode::OK, json!({"choices": []})).await;
    let client = OpenAIClient::new("k", "s").with_base_url(base);
    assert_eq!(client.complete(&[], "hi").await.unwrap(), "");
}

#[tokio::test]
async fn test_openai_status_classification() {
    let cases = [
        (StatusCode::TOO_MANY_REQUESTS, FailureKind::RateLimited),
        (StatusCode::UNAUTHORIZED, FailureKind::Unauthorized),
        (StatusCode::FORBIDDEN, FailureKind::Unauthorized),
        (StatusCode::INTERNAL_SERVER_ERROR, FailureKind::Unknown),
        (StatusCode::BAD_REQUEST, FailureKind::Unknown),
    ];

    for (status, expected) in cases {
        let (base, _) = fixture(
            "/v1/chat/completions",
            status,
            json!({"error": {"message": "failure", "type": "test"}}),
        )
        .await;
        let client = OpenAIClient::new("k", "s").with_base_url(base);
        let err = client.complete(&[], "hi").await.unwrap_err();
        assert_eq!(err.kind(), expected, "status {status}");
    }
}

#[tokio::test]
async fn test_openai_quota_error_is_rate_limited() {
    let (base, _) = fixture(
        "/v1/chat/completions",
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"message": "You exceeded your current quota", "type": "insufficient_quota"}}),
    )
    .await;
    let client = OpenAIClient::new("k", "s").with_base_url(base);
    let err = client.complete(&[], "hi").await.unwrap_err();
    assert!(matches!(err, AssistantError::RateLimited { status: 429, .. }));
}

// ========================================================================
// Claude
// ========================================================================

#[tokio::test]
async fn test_claude_request_shape_and_reply() {
    let (base, captured) = fixture(
        "/v1/messages",
        StatusCode::OK,
        json!({"content": [{"type": "text", "text": "Tours are on Fridays."}]}),
    )
    .await;

    let client = ClaudeClient::new("claude-key", "SYSTEM TEXT")
        .with_base_url(format!("{base}/"))
        .with_model("claude-test");
    let reply = client.complete(&history(), "Tours?").await.unwrap();
    assert_eq!(reply, "Tours are on Fridays.");

    let (headers, body) = taken(&captured);
    assert_eq!(headers["x-api-key"], "claude-key");
    assert_eq!(headers["anthropic-version"], "2023-06-01");
    assert_eq!(body["system"], "SYSTEM TEXT");
    assert_eq!(body["model"], "claude-test");

    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert!(messages.iter().all(|m| m["role"] != "system"));
    assert_eq!(messages[2], json!({"role": "user", "content": "Tours?"}));
}

#[tokio::test]
async fn test_claude_overloaded_is_rate_limited() {
    let status = StatusCode::from_u16(529).unwrap();
    let (base, _) = fixture(
        "/v1/messages",
        status,
        json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}),
    )
    .await;
    let client = ClaudeClient::new("k", "s").with_base_url(base);
    let err = client.complete(&[], "hi").await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::RateLimited);
}

#[tokio::test]
async fn test_claude_no_text_block_is_empty_reply() {
    let (base, _) = fixture("/v1/messages", StatusCode::OK, json!({"content": []})).await;
    let client = ClaudeClient::new("k", "s").with_base_url(base);
    assert_eq!(client.complete(&[], "hi").await.unwrap(), "");
}

// ========================================================================
// Ollama
// ========================================================================

#[tokio::test]
async fn test_ollama_request_shape_and_reply() {
    let (base, captured) = fixture(
        "/api/chat",
        StatusCode::OK,
        json!({"model": "m", "message": {"role": "assistant", "content": "Hello there"}, "done": true}),
    )
    .await;

    let client = OllamaClient::new("SYSTEM TEXT")
        .with_base_url(format!("{base}/"))
        .with_model("llama-test")
        .with_params(GenerationParams {
            max_tokens: 120,
            temperature: 0.25,
        });
    let reply = client.complete(&history(), "Hi").await.unwrap();
    assert_eq!(reply, "Hello there");

    let (_, body) = taken(&captured);
    assert_eq!(body["stream"], false);
    assert_eq!(body["model"], "llama-test");
    assert_eq!(body["options"]["num_predict"], 120);
    assert_eq!(body["options"]["temperature"].as_f64(), Some(0.25));
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_ollama_missing_model_is_unknown() {
    let (base, _) = fixture(
        "/api/chat",
        StatusCode::NOT_FOUND,
        json!({"error": "model 'llama-test' not found"}),
    )
    .await;
    let client = OllamaClient::new("s").with_base_url(base);
    let err = client.complete(&[], "hi").await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Unknown);
    assert!(err.to_string().contains("not found"));
}

// ========================================================================
// Proxy
// ========================================================================

#[tokio::test]
async fn test_proxy_sends_only_message() {
    let (base, captured) = fixture(
        "/api/chat",
        StatusCode::OK,
        json!({"reply": "Admissions are open!"}),
    )
    .await;

    let client = ProxyClient::new().with_base_url(format!("{base}/"));
    let reply = client.complete(&history(), "Are admissions open?").await.unwrap();
    assert_eq!(reply, "Admissions are open!");

    let (_, body) = taken(&captured);
    assert_eq!(body, json!({"message": "Are admissions open?"}));
}

#[tokio::test]
async fn test_proxy_error_body_classification() {
    let cases = [
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Failed to get response", "details": "429 Rate limit reached"}),
            FailureKind::RateLimited,
        ),
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Failed to get response", "details": "Invalid API key"}),
            FailureKind::Unauthorized,
        ),
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Failed to get response"}),
            FailureKind::Unknown,
        ),
        (
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": "slow down"}),
            FailureKind::RateLimited,
        ),
        (
            StatusCode::UNAUTHORIZED,
            json!({"error": "nope"}),
            FailureKind::Unauthorized,
        ),
    ];

    for (status, body, expected) in cases {
        let (base, _) = fixture("/api/chat", status, body.clone()).await;
        let client = ProxyClient::new().with_base_url(base);
        let err = client.complete(&[], "hi").await.unwrap_err();
        assert_eq!(err.kind(), expected, "status {status}, body {body}");
    }
}

#[tokio::test]
async fn test_proxy_missing_reply_is_empty() {
    let (base, _) = fixture("/api/chat", StatusCode::OK, json!({})).await;
    let client = ProxyClient::new().with_base_url(base);
    assert_eq!(client.complete(&[], "hi").await.unwrap(), "");
}

// ========================================================================
// Transport failures
// ========================================================================

#[tokio::test]
async fn test_unreachable_endpoint_is_unknown() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ProxyClient::new().with_base_url(format!("http://{addr}"));
    let err = client.complete(&[], "hi").await.unwrap_err();
    assert_eq!(err.kind(), FailureKind::Unknown);
}

#[tokio::test]
async fn test_timeout_is_reported_not_hung() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"reply": "late"}))
        }),
    );
    let base = serve(router).await;

    let client = ProxyClient::new()
        .with_base_url(base)
        .with_timeout(Some(Duration::from_millis(200)));
    let err = client.complete(&[], "hi").await.unwrap_err();
    assert!(matches!(err, AssistantError::Timeout));
    assert_eq!(err.kind(), FailureKind::Unknown);
}

// ========================================================================
// End to end through Settings
// ========================================================================

#[tokio::test]
async fn test_session_over_configured_proxy() {
    let (base, _) = fixture(
        "/api/chat",
        StatusCode::OK,
        json!({"reply": "We're open 8am–4pm, Mon–Fri."}),
    )
    .await;

    let mut settings = Settings::default();
    settings.set_provider(ProviderId::Proxy);
    settings.assistant.base_url = Some(base);

    let session = ChatSession::new(settings.build_gateway().unwrap());
    session.submit("What are your school hours?").await;

    assert_eq!(
        session.transcript().messages(),
        &[
            Message::user("What are your school hours?"),
            Message::assistant("We're open 8am–4pm, Mon–Fri."),
        ]
    );
    assert!(!session.is_pending());
}

#[tokio::test]
async fn test_session_over_rate_limited_openai() {
    let (base, _) = fixture(
        "/v1/chat/completions",
        StatusCode::TOO_MANY_REQUESTS,
        json!({"error": {"message": "Rate limit reached"}}),
    )
    .await;

    let gateway = Arc::new(OpenAIClient::new("k", "s").with_base_url(base));
    let session = ChatSession::new(gateway);
    session.submit("hi").await;

    assert_eq!(
        session.transcript().last().unwrap().content,
        fallback::RATE_LIMITED
    );
    assert!(!session.is_pending());
}
