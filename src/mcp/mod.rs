//! MCP (Model Context Protocol) server for perplexity-mcp.
//!
//! Exposes the four Perplexity query operations as MCP tools over
//! streamable HTTP, guarded by a bearer token.
//!
//! # Feature Gate
//!
//! This module requires the `mcp` feature flag (enabled by default).
//!
//! # Architecture
//!
//! ```text
//! MCP Client (agent)
//!   ↓ tools/call perplexity_*(query)      Authorization: Bearer <token>
//! PerplexityMcpServer::call_tool
//!   ├── ArgumentSanitizer
//!   └── BearerAuthenticator
//!   ↓ tool router
//! QueryService → UpstreamClient → extract_citations
//!   ↓
//! {"answer": ..., "sources": [{url, title}]} → MCP Client
//! ```

pub mod middleware;
pub mod params;
pub mod server;
pub mod transport;

pub use middleware::{
    ArgumentSanitizer, BearerAuthenticator, Interceptor, MiddlewareChain, ToolInvocation,
};
pub use params::QueryParams;
pub use server::PerplexityMcpServer;
pub use transport::{mcp_router, serve_http};
