//! Ollama backend implementation
//!
//! HTTP client for the Ollama `/api/generate` endpoint. One non-streaming
//! request per call, no retries.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{normalize_base_url, ResolvedConfig};
use crate::error::{Error, Result};
use crate::insight::RawCompletion;

use super::CompletionBackend;

/// Characters of a completion shown in debug logs
const LOG_PREVIEW_CHARS: usize = 100;

/// Characters of a non-2xx body carried into the error message
const ERROR_BODY_CHARS: usize = 200;

/// Ollama backend
///
/// The inner `reqwest::Client` holds the connection pool; clones share it.
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    /// Create a new Ollama backend with no request timeout
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: normalize_base_url(base_url),
            model: model.to_string(),
        }
    }

    /// Create a backend whose requests time out after `timeout`
    pub fn with_timeout(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: normalize_base_url(base_url),
            model: model.to_string(),
        })
    }

    /// Create from resolved configuration
    pub fn from_config(config: &ResolvedConfig) -> Result<Self> {
        Self::with_timeout(&config.api_url, &config.model, config.timeout)
    }
}

/// Request to Ollama API
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Error body Ollama sends with non-2xx statuses
#[derive(Debug, Deserialize)]
struct OllamaErrorBody {
    error: String,
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}

#[async_trait]
impl CompletionBackend for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<RawCompletion> {
        let url = format!("{}/api/generate", self.base_url);
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        info!(url = %url, model = %self.model, "Sending generate request to Ollama");

        let response = self.http_client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<OllamaErrorBody>(&body) {
                Ok(parsed) => parsed.error,
                Err(_) => preview(body.trim(), ERROR_BODY_CHARS),
            };
            warn!(status = status.as_u16(), error = %message, "Ollama returned an error status");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let ollama_response: OllamaResponse = response.json().await?;

        if !ollama_response.done {
            warn!(model = %self.model, "Ollama reported an incomplete generation");
        }
        debug!(
            "Ollama response: {}",
            ollama_response
                .response
                .as_deref()
                .map(|r| preview(r, LOG_PREVIEW_CHARS))
                .unwrap_or_else(|| "null".to_string())
        );

        let model_name = if ollama_response.model.is_empty() {
            self.model.clone()
        } else {
            ollama_response.model
        };

        Ok(RawCompletion {
            model_name,
            text: ollama_response.response,
            is_complete: ollama_response.done,
            transport_error: None,
            model_error: ollama_response.error,
        })
    }

    async fn health_check(&self) -> bool {
        match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}
