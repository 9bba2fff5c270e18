//! Error types for perplexity-mcp.
//!
//! Three failure classes reach the tool-invocation boundary:
//! configuration problems, credential problems, and upstream failures.
//! None of them are retried.

use thiserror::Error;

/// Result alias using the crate [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error for every operation in the request pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// Required configuration is absent (upstream key at startup,
    /// expected bearer token at call time).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Missing, malformed or incorrect credential, or the upstream
    /// rejected the API key.
    #[error("unauthorized: {0}")]
    Authentication(String),

    /// The chat-completion call itself failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl Error {
    /// Builds a [`Error::Configuration`].
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Builds a [`Error::Authentication`].
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }
}

/// Failures talking to the upstream chat-completion endpoint.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport-level failure (connect, TLS, body read).
    #[error("upstream request failed: {message}")]
    Request {
        /// Underlying error message.
        message: String,
    },

    /// The endpoint answered with a non-success status.
    #[error("upstream returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The response body could not be interpreted.
    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    /// The client handle was closed at session teardown.
    #[error("upstream client is closed")]
    Closed,
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.into())
    }
}
