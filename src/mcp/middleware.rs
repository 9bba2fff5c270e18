//! Tool-invocation middleware.
//!
//! Every `tools/call` passes through a [`MiddlewareChain`] before it is
//! dispatched. Each [`Interceptor`] either returns the (possibly rewritten)
//! invocation to continue the chain, or an error that aborts it.
//!
//! ```text
//! tools/call
//!   ↓
//! ArgumentSanitizer   drop keys not in the tool's input schema
//!   ↓
//! BearerAuthenticator check `Authorization: Bearer <token>`
//!   ↓
//! tool router → QueryService
//! ```

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use tracing::{debug, warn};

use crate::error::Error;

/// Authorization scheme prefix accepted by [`BearerAuthenticator`].
pub const BEARER_PREFIX: &str = "Bearer ";

/// A tool call as seen by the middleware chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Declared tool name.
    pub name: String,
    /// Call arguments.
    pub arguments: JsonObject,
    /// Raw `Authorization` header of the carrying HTTP request, if any.
    pub authorization: Option<String>,
}

/// One stage of the middleware chain.
pub trait Interceptor: Send + Sync {
    /// Stage name for logging.
    fn name(&self) -> &'static str;

    /// Forwards the invocation to the next stage, or rejects it.
    fn intercept(&self, invocation: ToolInvocation) -> Result<ToolInvocation, Error>;
}

/// Drops arguments a tool does not declare.
///
/// Callers sometimes inject metadata fields next to legitimate parameters;
/// strict schema validation downstream would reject the whole call. Tools
/// without a known schema pass through untouched. Never fails.
#[derive(Debug, Clone, Default)]
pub struct ArgumentSanitizer {
    accepted: HashMap<String, HashSet<String>>,
}

impl ArgumentSanitizer {
    /// Creates a sanitizer from explicit per-tool parameter names.
    #[must_use]
    pub const fn new(accepted: HashMap<String, HashSet<String>>) -> Self {
        Self { accepted }
    }

    /// Creates a sanitizer from published tool schemas.
    ///
    /// Tools whose schema has no `properties` object are left unrestricted.
    #[must_use]
    pub fn from_tools(tools: &[Tool]) -> Self {
        let accepted = tools
            .iter()
            .filter_map(|tool| {
                let properties = tool.input_schema.get("properties")?.as_object()?;
                Some((tool.name.to_string(), properties.keys().cloned().collect()))
            })
            .collect();
        Self { accepted }
    }

    /// Restricts `arguments` to the keys `tool` declares.
    #[must_use]
    pub fn sanitize(&self, tool: &str, mut arguments: JsonObject) -> JsonObject {
        let Some(accepted) = self.accepted.get(tool) else {
            return arguments;
        };

        arguments.retain(|key, _| {
            let keep = accepted.contains(key);
            if !keep {
                debug!(tool, key = %key, "dropping undeclared argument");
            }
            keep
        });
        arguments
    }
}

impl Interceptor for ArgumentSanitizer {
    fn name(&self) -> &'static str {
        "sanitize_arguments"
    }

    fn intercept(&self, mut invocation: ToolInvocation) -> Result<ToolInvocation, Error> {
        invocation.arguments = self.sanitize(&invocation.name, invocation.arguments);
        Ok(invocation)
    }
}

/// Requires `Authorization: Bearer <token>` matching the configured token.
///
/// A server started without an expected token fails closed: every call is
/// rejected with [`Error::Configuration`].
#[derive(Clone, Default)]
pub struct BearerAuthenticator {
    expected: Option<String>,
}

impl BearerAuthenticator {
    /// Creates an authenticator. Empty tokens count as unset.
    #[must_use]
    pub fn new(expected: Option<String>) -> Self {
        Self {
            expected: expected.filter(|t| !t.is_empty()),
        }
    }

    /// Checks a raw `Authorization` header value.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<(), Error> {
        let expected = self
            .expected
            .as_deref()
            .ok_or_else(|| Error::configuration("MCP_BEARER_TOKEN not set"))?;

        let token = authorization
            .and_then(|header| header.strip_prefix(BEARER_PREFIX))
            .ok_or_else(|| Error::authentication("missing Bearer token"))?;

        if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
            return Err(Error::authentication("invalid token"));
        }
        Ok(())
    }
}

impl std::fmt::Debug for BearerAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuthenticator")
            .field("configured", &self.expected.is_some())
            .finish()
    }
}

impl Interceptor for BearerAuthenticator {
    fn name(&self) -> &'static str {
        "bearer_auth"
    }

    fn intercept(&self, invocation: ToolInvocation) -> Result<ToolInvocation, Error> {
        self.authenticate(invocation.authorization.as_deref())?;
        Ok(invocation)
    }
}

/// Compares two byte strings without short-circuiting on the first difference.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Ordered list of interceptors applied to every tool call.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl MiddlewareChain {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The server's chain: sanitize arguments, then authenticate.
    #[must_use]
    pub fn standard(sanitizer: ArgumentSanitizer, authenticator: BearerAuthenticator) -> Self {
        Self::new().with(sanitizer).with(authenticator)
    }

    /// Appends an interceptor.
    #[must_use]
    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Number of interceptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns `true` if the chain has no interceptors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Runs every interceptor in order, then hands the result to `next`.
    ///
    /// `next` is not called if any interceptor rejects the invocation.
    pub async fn run<F, Fut>(
        &self,
        mut invocation: ToolInvocation,
        next: F,
    ) -> Result<Fut::Output, Error>
    where
        F: FnOnce(ToolInvocation) -> Fut,
        Fut: Future,
    {
        let tool = invocation.name.clone();
        for interceptor in &self.interceptors {
            invocation = interceptor.intercept(invocation).inspect_err(|e| {
                warn!(
                    interceptor = interceptor.name(),
                    tool = %tool,
                    error = %e,
                    "tool invocation rejected"
                );
            })?;
        }
        Ok(next(invocation).await)
    }
}

impl std::fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.interceptors.iter().map(|i| i.name()))
            .finish()
    }
}
