//! Query service binding the four operations to their upstream models.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::model::QueryModel;
use crate::core::{Citation, extract_citations};
use crate::error::Error;
use crate::upstream::{CompletionProvider, UpstreamClient};

/// Answer returned to the calling agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Answer text from the model.
    pub answer: String,
    /// Cited sources, in the order the upstream listed them.
    pub sources: Vec<Citation>,
}

/// Session-scoped query service.
///
/// One instance lives for the whole server session and is shared by every
/// tool invocation. [`QueryService::close`] tears down the upstream
/// connection; invocations after that fail.
#[derive(Clone)]
pub struct QueryService {
    provider: Arc<dyn CompletionProvider>,
}

impl QueryService {
    /// Creates a service over the given provider.
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Creates a service backed by an [`UpstreamClient`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if no upstream API key is available.
    pub fn from_env(api_key: Option<String>) -> Result<Self, Error> {
        Ok(Self::new(Arc::new(UpstreamClient::from_env(api_key)?)))
    }

    /// Runs `query` against `model` and collects the cited sources.
    ///
    /// Upstream failures are returned unchanged.
    #[instrument(skip(self, query), fields(provider = self.provider.name()))]
    pub async fn run_query(&self, query: &str, model: &str) -> Result<QueryResult, Error> {
        let response = self.provider.complete(query, model, None).await?;
        let sources = extract_citations(&response.content, response.annotations.as_deref());
        debug!(sources = sources.len(), tokens = response.tokens, "query answered");

        Ok(QueryResult {
            answer: response.content,
            sources,
        })
    }

    /// Runs `query` with the model bound to `operation`.
    pub async fn query(&self, operation: QueryModel, query: &str) -> Result<QueryResult, Error> {
        self.run_query(query, operation.model_id()).await
    }

    /// Direct web search. Best for finding current information quickly.
    pub async fn search(&self, query: &str) -> Result<QueryResult, Error> {
        self.query(QueryModel::Search, query).await
    }

    /// Conversational answer with real-time web search.
    pub async fn ask(&self, query: &str) -> Result<QueryResult, Error> {
        self.query(QueryModel::Ask, query).await
    }

    /// In-depth research across multiple sources.
    pub async fn research(&self, query: &str) -> Result<QueryResult, Error> {
        self.query(QueryModel::Research, query).await
    }

    /// Step-by-step reasoning for complex problems.
    pub async fn reason(&self, query: &str) -> Result<QueryResult, Error> {
        self.query(QueryModel::Reason, query).await
    }

    /// Closes the upstream connection. Safe to call more than once.
    pub async fn close(&self) {
        self.provider.close().await;
    }
}

impl std::fmt::Debug for QueryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryService")
            .field("provider", &self.provider.name())
            .finish()
    }
}
