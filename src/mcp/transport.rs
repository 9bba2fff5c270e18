//! MCP streamable HTTP transport.
//!
//! Serves the MCP endpoint at `/mcp` and owns the session lifecycle: the
//! shared [`QueryService`] is closed once the HTTP server has shut down.

use std::sync::Arc;

use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::server::PerplexityMcpServer;
use crate::search::QueryService;

/// Builds the router serving the MCP endpoint at `/mcp`.
///
/// Every MCP session gets its own [`PerplexityMcpServer`] sharing `service`.
/// Open sessions end when `ct` is cancelled.
pub fn mcp_router(
    service: QueryService,
    bearer_token: Option<String>,
    ct: &CancellationToken,
) -> axum::Router {
    let http_service = StreamableHttpService::new(
        move || Ok(PerplexityMcpServer::new(service.clone(), bearer_token.clone())),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            cancellation_token: ct.child_token(),
            ..Default::default()
        },
    );

    axum::Router::new().nest_service("/mcp", http_service)
}

/// Starts the MCP server with streamable HTTP transport.
///
/// Listens on the given host and port for incoming MCP connections at `/mcp`
/// until ctrl-c, then closes the query service.
///
/// # Errors
///
/// Returns an error if the server fails to bind or encounters a runtime error.
pub async fn serve_http(
    service: QueryService,
    bearer_token: Option<String>,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    let ct = CancellationToken::new();
    let router = mcp_router(service.clone(), bearer_token, &ct);

    let addr = format!("{host}:{port}");
    let tcp_listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Perplexity MCP server listening on http://{addr}/mcp");

    let served = axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            ct.cancel();
        })
        .await;

    service.close().await;
    info!("server stopped");

    served?;
    Ok(())
}
