//! Lumen Core Library
//!
//! Shared functionality for the Lumen topic insight service:
//! - Layered configuration for the model endpoint (flags, env, TOML, defaults)
//! - Pluggable completion backends (Ollama over HTTP, scripted mock)
//! - Prompt builder for the insight JSON schema
//! - Response normalizer that turns free-form completions into structured insights
//! - Insight orchestrator tying the pipeline together

pub mod ai;
pub mod config;
pub mod error;
pub mod insight;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIClient, CompletionBackend, MockBackend, OllamaBackend};
pub use config::{ConfigOverrides, DefaultedSetting, LumenConfig, ResolvedConfig};
pub use error::{Error, Result};
pub use insight::{
    build_prompt, normalize, Insight, InsightResult, InsightService, RawCompletion, RelatedLink,
    Topic,
};
