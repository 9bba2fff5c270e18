//! CLI command implementations.

use anyhow::Context;

use crate::cli::parser::{Cli, Commands};
use crate::search::{QueryModel, QueryService};

/// Executes the parsed command and returns the text to print on stdout.
///
/// # Errors
///
/// Returns an error if configuration is missing, the runtime cannot start,
/// or the command itself fails.
pub fn execute(cli: &Cli) -> anyhow::Result<String> {
    // Upstream key problems surface here, before any socket is bound.
    let service = QueryService::from_env(cli.api_key.clone())?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

    match &cli.command {
        #[cfg(feature = "mcp")]
        Commands::Serve {
            host,
            port,
            bearer_token,
        } => {
            if bearer_token.as_deref().is_none_or(str::is_empty) {
                tracing::warn!("MCP_BEARER_TOKEN not set; every tool call will be rejected");
            }
            rt.block_on(crate::mcp::serve_http(
                service,
                bearer_token.clone(),
                host,
                *port,
            ))
            .context("MCP server error")?;
            Ok(String::new())
        }
        Commands::Query { operation, query } => rt.block_on(cmd_query(&service, *operation, query)),
    }
}

/// Runs one query and renders the result as pretty JSON.
async fn cmd_query(
    service: &QueryService,
    operation: QueryModel,
    query: &str,
) -> anyhow::Result<String> {
    let result = service.query(operation, query).await;
    service.close().await;

    let result = result.with_context(|| format!("{operation} query failed"))?;
    Ok(serde_json::to_string_pretty(&result)?)
}
