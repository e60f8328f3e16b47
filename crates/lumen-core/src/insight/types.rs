//! Insight pipeline types
//!
//! `RawCompletion` is what the gateway hands back; `InsightResult` is what the
//! web layer serializes. Both are built fresh per request and never mutated.

use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Maximum topic length accepted at the boundary
pub const MAX_TOPIC_CHARS: usize = 1000;

/// A validated, non-blank topic
///
/// The prompt builder only accepts this type, so an empty topic cannot reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic(String);

impl Topic {
    /// Validate a user-supplied topic. The text is kept verbatim.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::Validation("Topic is required".into()));
        }
        if raw.chars().count() > MAX_TOPIC_CHARS {
            return Err(Error::Validation(format!(
                "Topic is too long (max {} characters)",
                MAX_TOPIC_CHARS
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transport-level result of one generate call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCompletion {
    /// Model that produced (or was asked to produce) the completion
    pub model_name: String,
    /// Completion text, if any
    pub text: Option<String>,
    /// Whether the backend reported the generation as finished
    pub is_complete: bool,
    /// Network, timeout or non-2xx failure
    pub transport_error: Option<String>,
    /// Error reported inside the model's response envelope
    pub model_error: Option<String>,
}

impl RawCompletion {
    /// A finished completion carrying `text`
    pub fn completed(model_name: &str, text: &str) -> Self {
        Self {
            model_name: model_name.to_string(),
            text: Some(text.to_string()),
            is_complete: true,
            transport_error: None,
            model_error: None,
        }
    }

    /// A call that never produced a usable envelope
    pub fn transport_failure(model_name: &str, error: impl Into<String>) -> Self {
        Self {
            model_name: model_name.to_string(),
            text: None,
            is_complete: false,
            transport_error: Some(error.into()),
            model_error: None,
        }
    }
}

/// A related reading link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedLink {
    pub title: String,
    pub url: String,
}

/// Successful, structured insight for a topic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub overview: String,
    pub key_concepts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applications: Option<String>,
    pub related_links: Vec<RelatedLink>,
}

/// Exactly one of a successful insight or an error, never a mix
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsightResult {
    Success(Insight),
    Error { message: String },
}

impl InsightResult {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error { message } => Some(message),
            Self::Success(_) => None,
        }
    }

    pub fn insight(&self) -> Option<&Insight> {
        match self {
            Self::Success(insight) => Some(insight),
            Self::Error { .. } => None,
        }
    }
}

/// Error payload shape shared with the web layer's validation errors
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: bool,
    message: &'a str,
}

impl Serialize for InsightResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Success(insight) => insight.serialize(serializer),
            Self::Error { message } => ErrorBody {
                error: true,
                message,
            }
            .serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_rejects_blank() {
        assert!(Topic::parse("").unwrap_err().is_validation());
        assert!(Topic::parse("   \n").unwrap_err().is_validation());
    }

    #[test]
    fn test_topic_keeps_text_verbatim() {
        let topic = Topic::parse("  Quantum tunnelling ").unwrap();
        assert_eq!(topic.as_str(), "  Quantum tunnelling ");
    }

    #[test]
    fn test_topic_too_long() {
        let long = "x".repeat(MAX_TOPIC_CHARS + 1);
        assert!(Topic::parse(&long).is_err());
        assert!(Topic::parse(&"x".repeat(MAX_TOPIC_CHARS)).is_ok());
    }

    #[test]
    fn test_serialize_success_omits_absent_fields() {
        let result = InsightResult::Success(Insight {
            overview: "X".into(),
            key_concepts: vec!["A".into()],
            facts: None,
            applications: None,
            related_links: vec![RelatedLink {
                title: "t".into(),
                url: "u".into(),
            }],
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["overview"], "X");
        assert_eq!(json["keyConcepts"][0], "A");
        assert_eq!(json["relatedLinks"][0]["url"], "u");
        assert!(json.get("facts").is_none());
        assert!(json.get("applications").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_serialize_error() {
        let result = InsightResult::error("boom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"error": true, "message": "boom"}));
        assert!(result.is_error());
        assert_eq!(result.error_message(), Some("boom"));
        assert!(result.insight().is_none());
    }
}
