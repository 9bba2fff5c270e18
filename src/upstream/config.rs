//! Upstream client configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use crate::error::Error;

/// Default OpenAI-compatible API base (OpenRouter).
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Environment variable holding the upstream API key.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "OPENROUTER_BASE_URL";

/// Configuration for the upstream chat-completion client.
#[derive(Clone)]
pub struct UpstreamConfig {
    /// API key sent as a bearer credential.
    pub api_key: String,
    /// API base URL without a trailing slash.
    pub base_url: String,
}

impl UpstreamConfig {
    /// Creates a new builder for `UpstreamConfig`.
    #[must_use]
    pub fn builder() -> UpstreamConfigBuilder {
        UpstreamConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no API key is found.
    pub fn from_env() -> Result<Self, Error> {
        Self::builder().from_env().build()
    }

    /// Key validation endpoint.
    pub(crate) fn auth_key_url(&self) -> String {
        format!("{}/auth/key", self.base_url)
    }

    /// Chat completion endpoint.
    pub(crate) fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Builder for [`UpstreamConfig`].
#[derive(Debug, Clone, Default)]
pub struct UpstreamConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
}

impl UpstreamConfigBuilder {
    /// Populates unset fields from environment variables.
    ///
    /// Empty values are treated as unset.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.api_key.is_none() {
            self.api_key = non_empty_env(API_KEY_ENV);
        }
        if self.base_url.is_none() {
            self.base_url = non_empty_env(BASE_URL_ENV);
        }
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the [`UpstreamConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no non-empty API key was set.
    pub fn build(self) -> Result<UpstreamConfig, Error> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::configuration(format!(
                    "upstream API key not configured. Set the {API_KEY_ENV} environment variable."
                ))
            })?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(UpstreamConfig { api_key, base_url })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
