use std::time::Duration;

/// Default LLM proxy base URL.
const DEFAULT_BASE_URL: &str = "https://llm-proxy.densematrix.ai";
/// Default model identifier.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
/// Hard timeout for one completion call, in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Maximum tokens the model may produce per completion.
pub const MAX_OUTPUT_TOKENS: u32 = 500;
/// Sampling temperature sent with every completion.
pub const TEMPERATURE: f64 = 0.8;

/// Connection settings for the chat-completions proxy.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL; `/v1/chat/completions` is appended.
    pub base_url: String,
    /// Bearer credential sent in the `Authorization` header.
    pub api_key: String,
    /// Model identifier forwarded to the proxy.
    pub model: String,
    /// Whole-call timeout (connect + request + body).
    pub timeout_secs: u64,
}

impl LlmConfig {
    /// Load LLM configuration from environment variables.
    ///
    /// | Env Var            | Default                            |
    /// |--------------------|------------------------------------|
    /// | `LLM_PROXY_URL`    | `https://llm-proxy.densematrix.ai` |
    /// | `LLM_PROXY_KEY`    | empty                              |
    /// | `LLM_MODEL`        | `gemini-2.5-flash`                 |
    /// | `LLM_TIMEOUT_SECS` | `30`                               |
    ///
    /// # Panics
    ///
    /// Panics if `LLM_TIMEOUT_SECS` is not a valid u64.
    pub fn from_env() -> Self {
        let base_url = std::env::var("LLM_PROXY_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        let api_key = std::env::var("LLM_PROXY_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("LLM_PROXY_KEY is not set; completion calls will be unauthenticated");
        }
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let timeout_secs: u64 = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("LLM_TIMEOUT_SECS must be a valid u64");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            timeout_secs,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL of the chat-completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}
