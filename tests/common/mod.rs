//! Fixture upstream server for integration tests.
//!
//! Serves `GET /api/v1/auth/key` and `POST /api/v1/chat/completions` on an
//! ephemeral port and counts the hits on each.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use perplexity_mcp::{UpstreamClient, UpstreamConfig};
use serde_json::{Value, json};

/// API key the fixture accepts.
pub const API_KEY: &str = "test-key";

/// Canned behavior of the fixture.
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    pub auth_status: StatusCode,
    pub auth_delay: Duration,
    pub chat_status: StatusCode,
    pub chat_response: Value,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            auth_status: StatusCode::OK,
            auth_delay: Duration::ZERO,
            chat_status: StatusCode::OK,
            chat_response: completion("Paris is the capital.", None),
        }
    }
}

impl FixtureConfig {
    pub fn with_response(mut self, response: Value) -> Self {
        self.chat_response = response;
        self
    }
}

#[derive(Debug, Default)]
struct Counters {
    auth_hits: AtomicUsize,
    chat_hits: AtomicUsize,
    last_body: Mutex<Option<Value>>,
}

struct FixtureState {
    config: FixtureConfig,
    counters: Arc<Counters>,
}

/// A running fixture upstream.
pub struct Fixture {
    pub base_url: String,
    counters: Arc<Counters>,
}

impl Fixture {
    pub fn auth_hits(&self) -> usize {
        self.counters.auth_hits.load(Ordering::SeqCst)
    }

    pub fn chat_hits(&self) -> usize {
        self.counters.chat_hits.load(Ordering::SeqCst)
    }

    pub fn last_body(&self) -> Option<Value> {
        self.counters.last_body.lock().unwrap().clone()
    }

    /// A client pointed at this fixture with the accepted key.
    pub fn client(&self) -> UpstreamClient {
        self.client_with_key(API_KEY)
    }

    pub fn client_with_key(&self, key: &str) -> UpstreamClient {
        let config = UpstreamConfig::builder()
            .api_key(key)
            .base_url(&self.base_url)
            .build()
            .unwrap();
        UpstreamClient::new(config)
    }
}

/// Builds a chat-completion response body.
pub fn completion(content: &str, annotations: Option<Value>) -> Value {
    let mut message = json!({"role": "assistant", "content": content});
    if let Some(annotations) = annotations {
        message["annotations"] = annotations;
    }
    json!({
        "id": "gen-1",
        "model": "perplexity/sonar",
        "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 5, "completion_tokens": 7, "total_tokens": 12}
    })
}

async fn auth_key(State(state): State<Arc<FixtureState>>, headers: HeaderMap) -> StatusCode {
    state.counters.auth_hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(state.config.auth_delay).await;

    let expected = format!("Bearer {API_KEY}");
    let presented = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    if presented != Some(expected.as_str()) {
        return StatusCode::UNAUTHORIZED;
    }
    state.config.auth_status
}

async fn chat_completions(
    State(state): State<Arc<FixtureState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.counters.chat_hits.fetch_add(1, Ordering::SeqCst);
    *state.counters.last_body.lock().unwrap() = Some(body);
    (state.config.chat_status, Json(state.config.chat_response.clone()))
}

/// Starts a fixture upstream on an ephemeral local port.
pub async fn spawn(config: FixtureConfig) -> Fixture {
    let counters = Arc::new(Counters::default());
    let state = Arc::new(FixtureState {
        config,
        counters: counters.clone(),
    });

    let app = Router::new()
        .route("/api/v1/auth/key", get(auth_key))
        .route("/api/v1/chat/completions", post(chat_completions))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Fixture {
        base_url: format!("http://{addr}/api/v1"),
        counters,
    }
}
