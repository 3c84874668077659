//! Text-completion backend seam.

use async_trait::async_trait;

use crate::error::CoreError;

/// A black-box text-completion service.
///
/// Implementations make exactly one call per invocation and never retry.
/// Every failure (transport, timeout, non-success status, malformed envelope)
/// is reported as [`CoreError::Backend`] carrying the underlying cause.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send `prompt` and return the raw text of the first completion.
    async fn complete(&self, prompt: &str) -> Result<String, CoreError>;
}
