//! Middleware chain in front of a live query service.

#![cfg(feature = "mcp")]
#![allow(clippy::unwrap_used)]

mod common;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use perplexity_mcp::mcp::{ArgumentSanitizer, BearerAuthenticator, MiddlewareChain, ToolInvocation};
use perplexity_mcp::{Error, QueryResult, QueryService};
use serde_json::json;

use common::{FixtureConfig, spawn};

fn chain(expected_token: Option<&str>) -> MiddlewareChain {
    let accepted: HashMap<String, HashSet<String>> = [(
        "perplexity_search".to_string(),
        ["query".to_string()].into_iter().collect(),
    )]
    .into_iter()
    .collect();
    MiddlewareChain::standard(
        ArgumentSanitizer::new(accepted),
        BearerAuthenticator::new(expected_token.map(str::to_string)),
    )
}

fn invocation(authorization: Option<&str>) -> ToolInvocation {
    ToolInvocation {
        name: "perplexity_search".to_string(),
        arguments: json!({"query": "capital of France", "client_meta": {"id": 1}})
            .as_object()
            .cloned()
            .unwrap(),
        authorization: authorization.map(str::to_string),
    }
}

async fn dispatch(
    chain: &MiddlewareChain,
    service: &QueryService,
    call: ToolInvocation,
) -> Result<QueryResult, Error> {
    chain
        .run(call, |invocation| async move {
            assert_eq!(invocation.arguments.len(), 1);
            let query = invocation.arguments["query"].as_str().unwrap().to_string();
            service.search(&query).await
        })
        .await?
}

#[tokio::test]
async fn missing_server_token_never_reaches_service() {
    let fixture = spawn(FixtureConfig::default()).await;
    let service = QueryService::new(Arc::new(fixture.client()));
    let chain = chain(None);

    for header in [None, Some("Bearer anything")] {
        let err = dispatch(&chain, &service, invocation(header)).await.unwrap_err();
        assert!(matches!(err, Error::Configuration(_)), "{err:?}");
    }

    assert_eq!(fixture.auth_hits(), 0);
    assert_eq!(fixture.chat_hits(), 0);
}

#[tokio::test]
async fn bad_credentials_never_reach_service() {
    let fixture = spawn(FixtureConfig::default()).await;
    let service = QueryService::new(Arc::new(fixture.client()));
    let chain = chain(Some("s3cret"));

    for header in [None, Some("Token s3cret"), Some("Bearer nope")] {
        let err = dispatch(&chain, &service, invocation(header)).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)), "{err:?}");
    }

    assert_eq!(fixture.chat_hits(), 0);
}

#[tokio::test]
async fn matching_token_forwards_to_service() {
    let fixture = spawn(FixtureConfig::default()).await;
    let service = QueryService::new(Arc::new(fixture.client()));
    let chain = chain(Some("s3cret"));

    let result = dispatch(&chain, &service, invocation(Some("Bearer s3cret")))
        .await
        .unwrap();

    assert_eq!(result.answer, "Paris is the capital.");
    assert!(result.sources.is_empty());
    assert_eq!(fixture.chat_hits(), 1);
}
