//! Completion provider trait.
//!
//! The query service talks to the upstream through this trait so that the
//! service can be exercised without a network and the transport can change
//! without touching service logic.

use async_trait::async_trait;

use super::message::CompletionResult;
use crate::error::Error;

/// Trait for chat-completion backends.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging (e.g., `"openrouter"`).
    fn name(&self) -> &'static str;

    /// Executes one chat completion against `model`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the upstream rejects the key,
    /// [`Error::Upstream`] on request, status or parse failures.
    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        system_prompt: Option<&str>,
    ) -> Result<CompletionResult, Error>;

    /// Releases the underlying connection. Idempotent.
    async fn close(&self);
}
