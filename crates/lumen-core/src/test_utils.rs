//! Test utilities for lumen-core
//!
//! A mock Ollama server speaking just enough of `/api/generate` and
//! `/api/tags` for integration tests and offline development.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// A well-formed fenced insight, as a cooperative model would answer
pub const SAMPLE_INSIGHT_REPLY: &str = r#"Sure! Here is the structured analysis you asked for.

```json
{
  "overview": "Tides are the periodic rise and fall of sea levels.",
  "keyConcepts": ["Gravitational pull of the moon", "Rotation of the earth"],
  "facts": ["Most coasts see two high tides a day"],
  "applications": "Tidal power generation"
}
```"#;

/// How the mock answers `/api/generate`
#[derive(Debug, Clone)]
pub enum MockGenerate {
    /// 200 with [`SAMPLE_INSIGHT_REPLY`]
    Insight,
    /// 200 with this completion text
    Text(String),
    /// 200 whose envelope carries an `error` field
    ModelError(String),
    /// Non-2xx status with an Ollama-style `{"error": ...}` body
    HttpError(u16, String),
    /// Sleep before answering with [`SAMPLE_INSIGHT_REPLY`]
    Slow(Duration),
}

#[derive(Clone)]
struct MockState {
    behavior: MockGenerate,
    calls: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<GenerateRequest>>>,
}

/// Mock Ollama server for testing and development
pub struct MockOllamaServer {
    addr: SocketAddr,
    state: MockState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockOllamaServer {
    /// Start the mock server on an available port, answering with a sample insight
    pub async fn start() -> Self {
        Self::start_with(MockGenerate::Insight).await
    }

    /// Start the mock server with a specific generate behavior
    pub async fn start_with(behavior: MockGenerate) -> Self {
        let state = MockState {
            behavior,
            calls: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        };

        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of generate requests received
    pub fn generate_calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// The most recent generate request body
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.state.last_request.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockOllamaServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama2:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 3_800_000_000,
        }],
    })
}

/// Ollama generate endpoint
async fn handle_generate(
    State(state): State<MockState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    state.calls.fetch_add(1, Ordering::SeqCst);
    let model = request.model.clone();
    *state.last_request.lock().unwrap() = Some(request);

    let reply = |response: &str| GenerateResponse {
        model: model.clone(),
        response: response.to_string(),
        done: true,
        error: None,
    };

    match &state.behavior {
        MockGenerate::Insight => Json(reply(SAMPLE_INSIGHT_REPLY)).into_response(),
        MockGenerate::Text(text) => Json(reply(text)).into_response(),
        MockGenerate::ModelError(message) => Json(GenerateResponse {
            error: Some(message.clone()),
            ..reply("")
        })
        .into_response(),
        MockGenerate::HttpError(status, message) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(serde_json::json!({ "error": message })),
        )
            .into_response(),
        MockGenerate::Slow(delay) => {
            tokio::time::sleep(*delay).await;
            Json(reply(SAMPLE_INSIGHT_REPLY)).into_response()
        }
    }
}

#[derive(Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

/// Body of a generate request as received by the mock
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}
