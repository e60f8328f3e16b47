//! Pluggable completion backend abstraction
//!
//! # Architecture
//!
//! - `CompletionBackend` trait: one non-streaming generate call plus a health probe
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OllamaBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = ResolvedConfig::load(None, &ConfigOverrides::default())?;
//! let client = AIClient::from_config(&config)?;
//! let raw = client.generate("Explain tides").await?;
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `AI_BACKEND`: Backend to use (ollama, mock). Default: ollama
//! - `OLLAMA_API_URL` / `OLLAMA_HOST`: Ollama server URL (default: http://localhost:11434)
//! - `OLLAMA_MODEL`: Model name (default: llama2)

mod mock;
mod ollama;

pub use mock::{MockBackend, MockReply};
pub use ollama::OllamaBackend;

use async_trait::async_trait;

use crate::config::ResolvedConfig;
use crate::error::Result;
use crate::insight::RawCompletion;

/// Trait implemented by every model-serving backend
///
/// Backends should be Send + Sync to allow use across async tasks.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one prompt and return the complete envelope
    ///
    /// `Err` means the call itself failed (network, timeout, non-2xx). Errors the
    /// model reports inside a successful response come back in
    /// [`RawCompletion::model_error`]. Implementations make exactly one attempt.
    async fn generate(&self, prompt: &str) -> Result<RawCompletion>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Ollama backend (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing and offline development
    Mock(MockBackend),
}

impl AIClient {
    /// Create a client from resolved configuration
    ///
    /// Checks `AI_BACKEND`: `mock` selects the scripted backend, anything else
    /// (including unset) selects Ollama.
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());

        match backend.to_lowercase().as_str() {
            "ollama" => Ok(AIClient::Ollama(OllamaBackend::from_config(config)?)),
            "mock" => Ok(AIClient::Mock(MockBackend::new().with_model(&config.model))),
            _ => {
                tracing::warn!(backend = %backend, "Unknown AI_BACKEND, falling back to ollama");
                Ok(AIClient::Ollama(OllamaBackend::from_config(config)?))
            }
        }
    }

    /// Create an Ollama backend directly
    pub fn ollama(host: &str, model: &str) -> Self {
        AIClient::Ollama(OllamaBackend::new(host, model))
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }
}

// Implement CompletionBackend for AIClient by delegating to the inner backend
#[async_trait]
impl CompletionBackend for AIClient {
    async fn generate(&self, prompt: &str) -> Result<RawCompletion> {
        match self {
            AIClient::Ollama(b) => b.generate(prompt).await,
            AIClient::Mock(b) => b.generate(prompt).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_client_mock() {
        let client = AIClient::mock();
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = AIClient::mock();
        assert!(client.health_check().await);
    }

    #[test]
    fn test_ai_client_ollama() {
        let client = AIClient::ollama("localhost:11434/", "mistral");
        assert_eq!(client.model(), "mistral");
        assert_eq!(client.host(), "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_mock_generate_through_client() {
        let client = AIClient::mock();
        let raw = client.generate("anything").await.unwrap();
        assert!(raw.is_complete);
        assert!(raw.text.is_some());
    }
}
