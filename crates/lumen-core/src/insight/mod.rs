//! Topic insights
//!
//! The pipeline is: validate topic → build prompt → one generate call →
//! normalize. Every failure past validation comes back as an
//! [`InsightResult::Error`], never as a panic or an `Err`.

mod heuristic;
mod normalize;
mod prompt;
mod types;

pub use heuristic::{
    APPLICATIONS_PLACEHOLDER, CONCEPT_PLACEHOLDER, FACT_PLACEHOLDER, OVERVIEW_PLACEHOLDER,
};
pub use normalize::{find_json_candidate, normalize, related_links, Extraction, JsonStrategy};
pub use prompt::build_prompt;
pub use types::{Insight, InsightResult, RawCompletion, RelatedLink, Topic, MAX_TOPIC_CHARS};

use std::any::Any;

use tracing::{error, info, warn};

use crate::ai::{AIClient, CompletionBackend};
use crate::error::Result;

/// Orchestrates insight generation against one backend
#[derive(Clone)]
pub struct InsightService {
    backend: AIClient,
}

impl InsightService {
    pub fn new(backend: AIClient) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &AIClient {
        &self.backend
    }

    /// Generate an insight for an already validated topic
    ///
    /// The generate/normalize step runs on its own task so a panic inside it
    /// is reported as an error result instead of unwinding into the caller.
    pub async fn get_insights(&self, topic: &Topic) -> InsightResult {
        let prompt = build_prompt(topic);
        let backend = self.backend.clone();

        info!(model = %backend.model(), topic_chars = topic.as_str().chars().count(), "Generating insight");

        let task = tokio::spawn(async move {
            let raw = match backend.generate(&prompt).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(error = %e, "Model call failed");
                    RawCompletion::transport_failure(backend.model(), e.to_string())
                }
            };
            normalize(&raw)
        });

        match task.await {
            Ok(result) => {
                if let Some(message) = result.error_message() {
                    warn!(error = %message, "Insight generation returned an error");
                }
                result
            }
            Err(e) => {
                error!(error = %e, "Insight task failed");
                let detail = if e.is_panic() {
                    panic_message(e.into_panic())
                } else {
                    e.to_string()
                };
                InsightResult::error(format!("Error processing the model request: {}", detail))
            }
        }
    }

    /// Validate `raw_topic`, then generate
    ///
    /// `Err` is only returned for validation failures; the backend is not
    /// called in that case.
    pub async fn get_insights_for(&self, raw_topic: &str) -> Result<InsightResult> {
        let topic = Topic::parse(raw_topic)?;
        Ok(self.get_insights(&topic).await)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
