//! HTTP client for the chat-completions proxy.
//!
//! Sends a single user message and returns the text of the first choice.
//! One attempt per call: retries are left to the caller.

use async_trait::async_trait;
use downgrader_core::backend::CompletionBackend;
use downgrader_core::error::CoreError;
use serde::{Deserialize, Serialize};

use crate::config::{LlmConfig, MAX_OUTPUT_TOKENS, TEMPERATURE};

/// Client for one chat-completions endpoint.
pub struct LlmClient {
    client: reqwest::Client,
    config: LlmConfig,
}

/// Errors from the completion call.
#[derive(Debug, thiserror::Error)]
pub enum LlmClientError {
    /// The call did not finish within the configured timeout.
    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The proxy returned a non-2xx status code.
    #[error("LLM API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The body was not a chat-completions envelope with at least one choice.
    #[error("Malformed completion response: {0}")]
    Envelope(String),
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

impl LlmClient {
    /// Create a client whose every request is bounded by `config.timeout()`.
    pub fn new(config: LlmConfig) -> Result<Self, LlmClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { client, config })
    }

    /// Send `prompt` as a single user message and return the first choice's
    /// content.
    pub async fn request_completion(&self, prompt: &str) -> Result<String, LlmClientError> {
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_OUTPUT_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.timeout())
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let response = Self::ensure_success(response).await?;
        let text = response.text().await.map_err(|e| self.classify(e))?;
        extract_content(&text)
    }

    // ---- private helpers ----

    fn classify(&self, err: reqwest::Error) -> LlmClientError {
        if err.is_timeout() {
            LlmClientError::Timeout(self.config.timeout_secs)
        } else {
            LlmClientError::Request(err)
        }
    }

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`LlmClientError::ApiError`] containing the
    /// status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, LlmClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(LlmClientError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

/// Pull `choices[0].message.content` out of a completion envelope.
fn extract_content(body: &str) -> Result<String, LlmClientError> {
    let envelope: ChatCompletionResponse =
        serde_json::from_str(body).map_err(|e| LlmClientError::Envelope(e.to_string()))?;
    envelope
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| LlmClientError::Envelope("response contained no choices".to_string()))
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String, CoreError> {
        self.request_completion(prompt).await.map_err(|e| {
            tracing::error!(error = %e, model = %self.config.model, "LLM completion failed");
            CoreError::Backend(e.to_string())
        })
    }
}
