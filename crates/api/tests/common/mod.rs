#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use downgrader_core::backend::CompletionBackend;
use downgrader_core::error::CoreError;
use downgrader_core::products::ProductCatalog;
use downgrader_db::models::generation_token::IssueGenerationToken;
use downgrader_db::repositories::GenerationTokenRepo;
use downgrader_db::PgQuotaLedger;
use downgrader_llm::LlmConfig;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use downgrader_api::config::ServerConfig;
use downgrader_api::router::build_app_router;
use downgrader_api::state::AppState;

pub const FREE_TRIAL_LIMIT: i32 = 1;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin and a 30-second request
/// timeout. The LLM settings are never used: tests inject a stub backend.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        free_trial_limit: FREE_TRIAL_LIMIT,
        llm: LlmConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: String::new(),
            model: "stub".to_string(),
            timeout_secs: 30,
        },
        products: ProductCatalog::default(),
    }
}

/// Completion backend returning a canned reply and counting calls.
pub struct StubBackend {
    reply: Result<String, String>,
    calls: AtomicUsize,
}

impl StubBackend {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(cause: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(cause.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for StubBackend {
    async fn complete(&self, _prompt: &str) -> Result<String, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(CoreError::Backend)
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and completion backend.
///
/// Goes through [`build_app_router`] so integration tests exercise the same
/// middleware stack (CORS, request ID, timeout, tracing, panic recovery)
/// that production uses.
pub fn build_test_app(pool: PgPool, backend: Arc<StubBackend>) -> Router {
    let config = test_config();
    let ledger = Arc::new(PgQuotaLedger::new(pool.clone(), config.free_trial_limit));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ledger,
        backend,
    };

    build_app_router(state, &config)
}

/// Insert a generation token with the given balance.
pub async fn issue_token(pool: &PgPool, token: &str, generations: i32) {
    let input = IssueGenerationToken {
        token: token.to_string(),
        product_id: Some("downgrade_pack_3".to_string()),
        generations,
        expires_at: None,
    };
    GenerationTokenRepo::issue(pool, &input).await.unwrap();
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
