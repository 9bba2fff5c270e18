//! Upstream client behavior against a fixture OpenRouter endpoint.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use perplexity_mcp::{CompletionProvider, Error, UpstreamError};
use serde_json::json;

use common::{FixtureConfig, completion, spawn};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_first_calls_validate_once() {
    let fixture = spawn(FixtureConfig {
        auth_delay: Duration::from_millis(100),
        ..Default::default()
    })
    .await;
    let client = Arc::new(fixture.client());

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .complete(&format!("query {i}"), "perplexity/sonar", None)
                    .await
            })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap();
        assert!(result.is_ok(), "{result:?}");
    }

    assert_eq!(fixture.auth_hits(), 1);
    assert_eq!(fixture.chat_hits(), 16);
}

#[tokio::test]
async fn validated_handle_does_not_revalidate() {
    let fixture = spawn(FixtureConfig::default()).await;
    let client = fixture.client();

    client.complete("a", "perplexity/sonar", None).await.unwrap();
    client.complete("b", "perplexity/sonar", None).await.unwrap();

    assert_eq!(fixture.auth_hits(), 1);
    assert_eq!(fixture.chat_hits(), 2);
}

#[tokio::test]
async fn rejected_key_is_authentication_error() {
    let fixture = spawn(FixtureConfig::default()).await;
    let client = fixture.client_with_key("wrong-key");

    let err = client
        .complete("q", "perplexity/sonar", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)), "{err:?}");
    assert!(err.to_string().contains("401"));
    assert_eq!(fixture.chat_hits(), 0);

    // a failed validation leaves the handle unvalidated
    let _ = client.complete("q", "perplexity/sonar", None).await;
    assert_eq!(fixture.auth_hits(), 2);
    assert_eq!(fixture.chat_hits(), 0);
}

#[tokio::test]
async fn non_200_validation_status_is_rejected() {
    let fixture = spawn(FixtureConfig {
        auth_status: StatusCode::NO_CONTENT,
        ..Default::default()
    })
    .await;

    let err = fixture
        .client()
        .complete("q", "perplexity/sonar", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
}

#[tokio::test]
async fn request_carries_model_and_messages() {
    let fixture = spawn(FixtureConfig::default()).await;
    let client = fixture.client();

    let result = client
        .complete("capital of France", "perplexity/sonar-pro", Some("Be brief."))
        .await
        .unwrap();

    let body = fixture.last_body().unwrap();
    assert_eq!(body["model"], "perplexity/sonar-pro");
    assert_eq!(
        body["messages"],
        json!([
            {"role": "system", "content": "Be brief."},
            {"role": "user", "content": "capital of France"}
        ])
    );

    assert_eq!(result.content, "Paris is the capital.");
    assert_eq!(result.model, "perplexity/sonar");
    assert_eq!(result.tokens, 12);
    assert!(result.annotations.is_none());
}

#[tokio::test]
async fn mixed_annotation_shapes_are_accepted() {
    let annotations = json!([
        {"type": "url_citation", "url_citation": {"url": "https://a.test", "title": "A", "start_index": 0}},
        {"type": "url_citation", "url_citation": {"url": "https://b.test", "title": null}},
        {"type": "file_citation", "file_citation": {"file_id": "f"}},
        "stray"
    ]);
    let fixture =
        spawn(FixtureConfig::default().with_response(completion("answer", Some(annotations)))).await;

    let result = fixture
        .client()
        .complete("q", "perplexity/sonar", None)
        .await
        .unwrap();
    assert_eq!(result.annotations.map(|a| a.len()), Some(4));
}

#[tokio::test]
async fn upstream_status_error_propagates() {
    let fixture = spawn(FixtureConfig {
        chat_status: StatusCode::BAD_GATEWAY,
        chat_response: json!({"error": {"message": "provider down"}}),
        ..Default::default()
    })
    .await;

    let err = fixture
        .client()
        .complete("q", "perplexity/sonar", None)
        .await
        .unwrap_err();
    match err {
        Error::Upstream(UpstreamError::Status { status, body }) => {
            assert_eq!(status, 502);
            assert!(body.contains("provider down"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_response_is_upstream_error() {
    let fixture =
        spawn(FixtureConfig::default().with_response(json!({"choices": "not a list"}))).await;

    let err = fixture
        .client()
        .complete("q", "perplexity/sonar", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Upstream(UpstreamError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn empty_choices_is_upstream_error() {
    let fixture = spawn(FixtureConfig::default().with_response(json!({"choices": []}))).await;

    let err = fixture
        .client()
        .complete("q", "perplexity/sonar", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Upstream(UpstreamError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn closed_client_rejects_calls_without_network() {
    let fixture = spawn(FixtureConfig::default()).await;
    let client = fixture.client();

    client.complete("q", "perplexity/sonar", None).await.unwrap();
    client.close().await;
    client.close().await;

    let err = client
        .complete("q", "perplexity/sonar", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Upstream(UpstreamError::Closed)));
    assert_eq!(fixture.auth_hits(), 1);
    assert_eq!(fixture.chat_hits(), 1);
}
