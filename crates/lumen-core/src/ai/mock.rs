//! Mock backend for testing
//!
//! Returns a scripted reply for every prompt and records what it was asked.
//! Useful for unit tests and development without a running LLM server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::insight::RawCompletion;

use super::CompletionBackend;

/// Default reply: a well-formed fenced insight
const DEFAULT_REPLY: &str = r#"Here is the analysis:
```json
{
  "overview": "Mock overview of the requested topic.",
  "keyConcepts": ["First mock concept", "Second mock concept"],
  "facts": ["Mock fact"],
  "applications": "Mock applications"
}
```"#;

/// What the mock answers with
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A completed response carrying this text
    Text(String),
    /// A response whose envelope reports a model error
    ModelError(String),
    /// The call fails before any envelope arrives
    TransportError(String),
    /// The backend panics with this message
    Panic(String),
}

/// Mock completion backend
///
/// Clones share the call counter and prompt log.
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    model: String,
    reply: MockReply,
    calls: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, answers with a fenced insight)
    pub fn new() -> Self {
        Self {
            healthy: true,
            model: "mock".to_string(),
            reply: MockReply::Text(DEFAULT_REPLY.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Answer every prompt with `reply`
    pub fn replying(reply: MockReply) -> Self {
        Self {
            reply,
            ..Self::new()
        }
    }

    /// Shorthand for a plain text reply
    pub fn with_text(text: &str) -> Self {
        Self::replying(MockReply::Text(text.to_string()))
    }

    /// Create a new instance with a different model (shares counters)
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// Number of generate calls received
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<RawCompletion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        match &self.reply {
            MockReply::Text(text) => Ok(RawCompletion::completed(&self.model, text)),
            MockReply::ModelError(message) => Ok(RawCompletion {
                model_error: Some(message.clone()),
                ..RawCompletion::completed(&self.model, "")
            }),
            MockReply::TransportError(message) => Err(Error::Transport(message.clone())),
            MockReply::Panic(message) => panic!("{}", message),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
