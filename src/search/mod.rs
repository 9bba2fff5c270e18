//! Perplexity query operations.
//!
//! Each operation is a fixed binding of [`QueryService::run_query`] to one
//! upstream model; see [`QueryModel`] for the bindings.

pub mod model;
pub mod service;

pub use model::QueryModel;
pub use service::{QueryResult, QueryService};
