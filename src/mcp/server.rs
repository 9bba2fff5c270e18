//! MCP server implementation for perplexity-mcp.
//!
//! Publishes the four query tools and routes every `tools/call` through the
//! [`MiddlewareChain`] before dispatching to the tool router.

use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::tool::ToolCallContext;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, tool, tool_router};

use super::middleware::{ArgumentSanitizer, BearerAuthenticator, MiddlewareChain, ToolInvocation};
use super::params::QueryParams;
use crate::error::Error;
use crate::search::{QueryResult, QueryService};

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        match &err {
            Error::Authentication(message) => {
                Self::invalid_request(format!("Unauthorized: {message}"), None)
            }
            Error::Configuration(message) => {
                Self::internal_error(format!("Server misconfigured: {message}"), None)
            }
            Error::Upstream(_) => Self::internal_error(err.to_string(), None),
        }
    }
}

/// Reads the `Authorization` header from the HTTP request carrying the call.
///
/// The streamable HTTP transport stores the request parts in the context
/// extensions; other transports carry no headers.
fn authorization_header(context: &RequestContext<RoleServer>) -> Option<String> {
    context
        .extensions
        .get::<Parts>()?
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .map(str::to_string)
}

/// Perplexity MCP server.
///
/// One instance is created per MCP connection; all instances share the
/// session's [`QueryService`].
#[derive(Clone)]
pub struct PerplexityMcpServer {
    tool_router: ToolRouter<Self>,
    service: QueryService,
    chain: MiddlewareChain,
}

#[tool_router]
impl PerplexityMcpServer {
    #[tool(
        name = "perplexity_search",
        description = "Performs web search using the Perplexity Sonar model. Perfect for finding up-to-date facts, news, or specific information quickly. Returns JSON with the answer and its sources (list of {url, title} citations)."
    )]
    async fn perplexity_search(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.service.search(&params.query).await)
    }

    #[tool(
        name = "perplexity_ask",
        description = "Engages in a conversation using the Sonar Pro model. Best for answering questions with up-to-date information from real-time web search. Returns JSON with the answer and its sources (list of {url, title} citations)."
    )]
    async fn perplexity_ask(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.service.ask(&params.query).await)
    }

    #[tool(
        name = "perplexity_research",
        description = "Performs deep research using the Sonar Deep Research model. Best for in-depth research requiring multiple sources; slower than the other tools. Returns JSON with the answer and its sources (list of {url, title} citations)."
    )]
    async fn perplexity_research(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.service.research(&params.query).await)
    }

    #[tool(
        name = "perplexity_reason",
        description = "Performs reasoning tasks using the Sonar Reasoning Pro model. Best for complex problems requiring step-by-step reasoning. Returns JSON with the answer and its sources (list of {url, title} citations)."
    )]
    async fn perplexity_reason(
        &self,
        Parameters(params): Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.service.reason(&params.query).await)
    }
}

/// Serializes a query result as the tool's text content.
fn respond(result: Result<QueryResult, Error>) -> Result<CallToolResult, McpError> {
    let result = result?;
    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {e}"), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

impl ServerHandler for PerplexityMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                title: Some("Perplexity MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Perplexity Sonar models via OpenRouter. Use `perplexity_search` for quick \
                 lookups, `perplexity_ask` for questions, `perplexity_research` for in-depth \
                 multi-source research and `perplexity_reason` for step-by-step reasoning. \
                 Every call requires `Authorization: Bearer <token>`."
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.tool_router.list_all(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        mut request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let invocation = ToolInvocation {
            name: request.name.to_string(),
            arguments: request.arguments.take().unwrap_or_default(),
            authorization: authorization_header(&context),
        };

        self.chain
            .run(invocation, |invocation| {
                request.arguments = Some(invocation.arguments);
                self.tool_router
                    .call(ToolCallContext::new(self, request, context))
            })
            .await?
    }
}

impl PerplexityMcpServer {
    /// Creates a server bound to the session's query service.
    ///
    /// The argument sanitizer is derived from the published tool schemas.
    /// `bearer_token` is the token callers must present; `None` makes
    /// every call fail with a configuration error.
    #[must_use]
    pub fn new(service: QueryService, bearer_token: Option<String>) -> Self {
        let tool_router = Self::tool_router();
        let sanitizer = ArgumentSanitizer::from_tools(&tool_router.list_all());
        let chain = MiddlewareChain::standard(sanitizer, BearerAuthenticator::new(bearer_token));

        Self {
            tool_router,
            service,
            chain,
        }
    }

    /// Published tool definitions.
    #[must_use]
    pub fn tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Middleware applied to every tool call.
    #[must_use]
    pub const fn chain(&self) -> &MiddlewareChain {
        &self.chain
    }
}

impl std::fmt::Debug for PerplexityMcpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PerplexityMcpServer")
            .field("service", &self.service)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}
