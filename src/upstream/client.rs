//! OpenRouter chat-completion client.
//!
//! The client owns one lazily validated HTTP connection. The API key is
//! checked against the upstream auth endpoint on first use, exactly once
//! per handle, and the connection is dropped on [`UpstreamClient::close`].

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::config::UpstreamConfig;
use super::message::{CompletionResponse, CompletionResult, build_messages, build_request};
use super::provider::CompletionProvider;
use crate::error::{Error, UpstreamError};

/// Maximum characters of an error body kept in [`UpstreamError::Status`].
const ERROR_BODY_LIMIT: usize = 512;

/// Connection lifecycle of a handle.
///
/// `Idle` until the first successful key validation, `Ready` afterwards,
/// `Closed` once torn down. `Closed` is terminal.
#[derive(Debug)]
enum ConnectionState {
    Idle,
    Ready(reqwest::Client),
    Closed,
}

/// Session-scoped client for the upstream chat-completion API.
///
/// The state mutex is held across key validation, so concurrent first
/// calls perform a single validation request and none of them proceeds
/// with an unvalidated connection.
pub struct UpstreamClient {
    config: UpstreamConfig,
    state: Mutex<ConnectionState>,
}

impl UpstreamClient {
    /// Creates a client. Performs no network I/O.
    #[must_use]
    pub fn new(config: UpstreamConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ConnectionState::Idle),
        }
    }

    /// Creates a client from an explicit key or the environment.
    ///
    /// An empty explicit key falls back to the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no key is available from either.
    pub fn from_env(api_key: Option<String>) -> Result<Self, Error> {
        let mut builder = UpstreamConfig::builder();
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            builder = builder.api_key(key);
        }
        Ok(Self::new(builder.from_env().build()?))
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Returns the validated connection, validating the key on first use.
    async fn connection(&self) -> Result<reqwest::Client, Error> {
        let mut state = self.state.lock().await;
        match &*state {
            ConnectionState::Ready(http) => Ok(http.clone()),
            ConnectionState::Closed => Err(UpstreamError::Closed.into()),
            ConnectionState::Idle => {
                let http = reqwest::Client::builder()
                    .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
                    .build()?;
                self.validate_key(&http).await?;
                *state = ConnectionState::Ready(http.clone());
                Ok(http)
            }
        }
    }

    async fn validate_key(&self, http: &reqwest::Client) -> Result<(), Error> {
        let response = http
            .get(self.config.auth_key_url())
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!(status = status.as_u16(), "upstream rejected API key");
            return Err(Error::authentication(format!(
                "invalid upstream API key (status {})",
                status.as_u16()
            )));
        }

        info!("upstream API key validated");
        Ok(())
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("config", &self.config)
            .field("state", &"<mutex>")
            .finish()
    }
}

#[async_trait]
impl CompletionProvider for UpstreamClient {
    fn name(&self) -> &'static str {
        "openrouter"
    }

    async fn complete(
        &self,
        prompt: &str,
        model: &str,
        system_prompt: Option<&str>,
    ) -> Result<CompletionResult, Error> {
        let http = self.connection().await?;

        let messages = build_messages(prompt, system_prompt);
        let request = build_request(model, &messages);
        debug!(model, messages = messages.len(), "sending chat completion");

        let response = http
            .post(self.config.chat_completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            }
            .into());
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::MalformedResponse(e.to_string()))?;

        let result = parsed.into_result(model).ok_or_else(|| {
            UpstreamError::MalformedResponse("response contained no choices".to_string())
        })?;

        info!(
            model = %result.model,
            tokens = result.tokens,
            annotations = result.annotations.as_ref().map_or(0, Vec::len),
            "chat completion finished"
        );
        Ok(result)
    }

    async fn close(&self) {
        let mut state = self.state.lock().await;
        if matches!(*state, ConnectionState::Ready(_)) {
            debug!("closing upstream connection");
        }
        *state = ConnectionState::Closed;
    }
}
