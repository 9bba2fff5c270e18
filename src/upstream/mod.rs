//! Upstream chat-completion access.
//!
//! # Architecture
//!
//! ```text
//! QueryService
//!   ↓ complete(prompt, model)
//! CompletionProvider (trait)
//!   ↓
//! UpstreamClient
//!   ├── first use: GET  {base}/auth/key          (once per handle)
//!   └── each call: POST {base}/chat/completions
//!   ↓
//! CompletionResult { content, model, tokens, annotations }
//! ```

pub mod client;
pub mod config;
pub mod message;
pub mod provider;

pub use client::UpstreamClient;
pub use config::{DEFAULT_BASE_URL, UpstreamConfig};
pub use message::{ChatMessage, CompletionResult, Role};
pub use provider::CompletionProvider;
