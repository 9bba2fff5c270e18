//! CLI layer for perplexity-mcp.
//!
//! Provides the command-line interface using clap: `serve` runs the MCP
//! server, `query` runs a single operation from the terminal.

pub mod commands;
pub mod parser;

pub use commands::execute;
pub use parser::{Cli, Commands};
