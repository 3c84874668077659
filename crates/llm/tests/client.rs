//! Integration tests for [`LlmClient`] against a local stub of the
//! chat-completions endpoint.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use downgrader_core::backend::CompletionBackend;
use downgrader_core::error::CoreError;
use downgrader_llm::{LlmClient, LlmClientError, LlmConfig};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Stub server
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct Stub {
    status: StatusCode,
    body: String,
    delay: Duration,
    calls: Arc<AtomicUsize>,
    last_request: Arc<std::sync::Mutex<Option<(HeaderMap, Value)>>>,
}

impl Stub {
    fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(std::sync::Mutex::new(None)),
        }
    }
}

async fn completions(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, String) {
    stub.calls.fetch_add(1, Ordering::SeqCst);
    *stub.last_request.lock().unwrap() = Some((headers, body));
    tokio::time::sleep(stub.delay).await;
    (stub.status, stub.body.clone())
}

/// Serve the stub on an ephemeral port and return its base URL.
async fn serve(stub: Stub) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(base_url: String, timeout_secs: u64) -> LlmConfig {
    LlmConfig {
        base_url,
        api_key: "sk-test".to_string(),
        model: "test-model".to_string(),
        timeout_secs,
    }
}

fn envelope(content: &str) -> String {
    json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
        .to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn returns_first_choice_content_and_sends_expected_request() {
    let stub = Stub::new(StatusCode::OK, envelope(r#"{"downgraded": "ok", "hype_score": 3}"#));
    let base_url = serve(stub.clone()).await;
    let client = LlmClient::new(config(base_url, 30)).unwrap();

    let text = client.request_completion("the prompt").await.unwrap();

    assert_eq!(text, r#"{"downgraded": "ok", "hype_score": 3}"#);
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);

    let (headers, body) = stub.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(headers["authorization"], "Bearer sk-test");
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["messages"][0]["content"], "the prompt");
    assert_eq!(body["max_tokens"], 500);
}

#[tokio::test]
async fn non_success_status_is_api_error_without_retry() {
    let stub = Stub::new(StatusCode::BAD_GATEWAY, "upstream down");
    let base_url = serve(stub.clone()).await;
    let client = LlmClient::new(config(base_url, 30)).unwrap();

    let err = client.request_completion("p").await.unwrap_err();

    assert_matches!(
        err,
        LlmClientError::ApiError { status: 502, ref body } if body == "upstream down"
    );
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_envelope_is_envelope_error() {
    let stub = Stub::new(StatusCode::OK, r#"{"id": "x"}"#);
    let client = LlmClient::new(config(serve(stub).await, 30)).unwrap();

    assert_matches!(
        client.request_completion("p").await,
        Err(LlmClientError::Envelope(_))
    );
}

#[tokio::test]
async fn slow_backend_times_out() {
    let mut stub = Stub::new(StatusCode::OK, envelope("late"));
    stub.delay = Duration::from_secs(3);
    let client = LlmClient::new(config(serve(stub).await, 1)).unwrap();

    assert_matches!(
        client.request_completion("p").await,
        Err(LlmClientError::Timeout(1))
    );
}

#[tokio::test]
async fn unreachable_backend_is_request_error() {
    // Bind and drop a listener to get a port nothing is listening on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = LlmClient::new(config(format!("http://{addr}"), 5)).unwrap();

    assert_matches!(
        client.request_completion("p").await,
        Err(LlmClientError::Request(_))
    );
}

#[tokio::test]
async fn backend_trait_maps_failures_to_core_backend_error() {
    let stub = Stub::new(StatusCode::INTERNAL_SERVER_ERROR, "boom");
    let client = LlmClient::new(config(serve(stub).await, 30)).unwrap();
    let backend: &dyn CompletionBackend = &client;

    let err = backend.complete("p").await.unwrap_err();

    assert_matches!(
        err,
        CoreError::Backend(ref cause) if cause.contains("500") && cause.contains("boom")
    );
}
