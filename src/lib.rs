//! # perplexity-mcp
//!
//! Authenticated MCP server exposing four Perplexity Sonar operations
//! (`search`, `ask`, `research`, `reason`) as tools. Each tool forwards its
//! query to a fixed model on an OpenAI-compatible chat-completion API
//! (OpenRouter by default) and returns the answer with its cited sources.
//!
//! ## Modules
//!
//! - [`core`]: citation extraction from upstream annotations
//! - [`upstream`]: lazily validated chat-completion client
//! - [`search`]: the query service and its model bindings
//! - [`mcp`]: MCP server, middleware chain and HTTP transport
//! - [`cli`]: command-line entry point
//!
//! ## Example
//!
//! ```no_run
//! use perplexity_mcp::search::QueryService;
//!
//! # async fn run() -> Result<(), perplexity_mcp::Error> {
//! let service = QueryService::from_env(None)?;
//! let result = service.search("capital of France").await?;
//! println!("{}", result.answer);
//! service.close().await;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod core;
pub mod error;
#[cfg(feature = "mcp")]
pub mod mcp;
pub mod search;
pub mod upstream;

pub use crate::core::{Citation, extract_citations};
pub use error::{Error, Result, UpstreamError};
pub use search::{QueryModel, QueryResult, QueryService};
pub use upstream::{CompletionProvider, CompletionResult, UpstreamClient, UpstreamConfig};
