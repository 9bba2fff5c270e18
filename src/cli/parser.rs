//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros. Every option that
//! carries configuration can also be supplied through its environment
//! variable.

use clap::{ArgAction, Parser, Subcommand};

use crate::search::QueryModel;

/// Perplexity MCP server.
///
/// Exposes Perplexity Sonar search, ask, research and reason as MCP tools
/// backed by OpenRouter.
#[derive(Parser, Debug)]
#[command(name = "perplexity-mcp")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Upstream (OpenRouter) API key.
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the MCP server with streamable HTTP transport.
    ///
    /// Serves MCP at `http://<host>:<port>/mcp`. Every tool call must carry
    /// `Authorization: Bearer <token>` matching `--bearer-token`.
    #[cfg(feature = "mcp")]
    #[command(after_help = r#"Examples:
  perplexity-mcp serve                               # Listen on 0.0.0.0:8001
  perplexity-mcp serve --host 127.0.0.1 --port 9000
  MCP_BEARER_TOKEN=s3cret OPENROUTER_API_KEY=sk-or-... perplexity-mcp serve
"#)]
    Serve {
        /// Host to bind to.
        #[arg(long, env = "MCP_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to bind to.
        #[arg(long, env = "MCP_PORT", default_value = "8001")]
        port: u16,

        /// Token callers must present as `Authorization: Bearer <token>`.
        ///
        /// When unset the server still starts, but every tool call fails.
        #[arg(long, env = "MCP_BEARER_TOKEN", hide_env_values = true)]
        bearer_token: Option<String>,
    },

    /// Run a single query and print the JSON result.
    #[command(after_help = r#"Examples:
  perplexity-mcp query search "capital of France"
  perplexity-mcp query research "history of the borrow checker"
"#)]
    Query {
        /// Operation to run.
        #[arg(value_enum)]
        operation: QueryModel,

        /// Query text.
        query: String,
    },
}
