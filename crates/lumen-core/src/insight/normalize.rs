//! Response normalizer
//!
//! Turns a raw completion into an [`InsightResult`]:
//!
//! 1. Transport or model errors short-circuit to an error result.
//! 2. JSON strategies run in order ([`JSON_STRATEGIES`]); the first match is
//!    the candidate and its recognized fields are taken as-is.
//! 3. If no candidate parses, the heuristic extractor takes over.
//! 4. Related links are synthesized from the model name and applications.
//!
//! A partially populated JSON object is never patched with heuristic output.
//! Missing fields stay empty or absent.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::heuristic;
use super::types::{Insight, InsightResult, RawCompletion, RelatedLink};

/// Characters of `applications` embedded in the second related link
const APPLICATIONS_SNIPPET_CHARS: usize = 20;

const MODEL_LINK_PREFIX: &str = "Additional information about ";
const MODEL_LIBRARY_URL: &str = "https://ollama.com/library/";
const APPLICATIONS_LINK_TITLE: &str = "Practical applications and examples";
const APPLICATIONS_SEARCH_URL: &str = "https://example.com/search?q=examples+";

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```(?i:json)?(.*?)```").expect("valid regex"))
}

/// Ways of locating a JSON object inside completion text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStrategy {
    /// First ``` fenced block whose trimmed body looks like an object
    FencedBlock,
    /// First `{` through the next `}`, accepted only if it parses
    BraceMatch,
}

/// Strategies in the order they are tried
pub const JSON_STRATEGIES: &[JsonStrategy] = &[JsonStrategy::FencedBlock, JsonStrategy::BraceMatch];

/// Outcome of one strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction<'a> {
    Matched(&'a str),
    NoMatch,
}

impl JsonStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FencedBlock => "fenced_block",
            Self::BraceMatch => "brace_match",
        }
    }

    pub fn extract<'a>(&self, text: &'a str) -> Extraction<'a> {
        match self {
            Self::FencedBlock => {
                let body = fenced_block()
                    .captures(text)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().trim());
                match body {
                    Some(b) if b.starts_with('{') && b.ends_with('}') => Extraction::Matched(b),
                    _ => Extraction::NoMatch,
                }
            }
            Self::BraceMatch => {
                let Some(start) = text.find('{') else {
                    return Extraction::NoMatch;
                };
                let Some(len) = text[start..].find('}') else {
                    return Extraction::NoMatch;
                };
                let candidate = &text[start..=start + len];
                match serde_json::from_str::<Value>(candidate) {
                    Ok(_) => Extraction::Matched(candidate),
                    Err(e) => {
                        debug!(error = %e, "Brace-matched candidate is not valid JSON");
                        Extraction::NoMatch
                    }
                }
            }
        }
    }
}

/// Run the strategies in order and return the first candidate
pub fn find_json_candidate(text: &str) -> Option<(JsonStrategy, &str)> {
    JSON_STRATEGIES
        .iter()
        .find_map(|strategy| match strategy.extract(text) {
            Extraction::Matched(candidate) => Some((*strategy, candidate)),
            Extraction::NoMatch => None,
        })
}

/// Recognized fields of a parsed JSON object; absent fields stay `None`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct JsonFields {
    overview: Option<String>,
    key_concepts: Option<Vec<String>>,
    facts: Option<Vec<String>>,
    applications: Option<String>,
}

impl JsonFields {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            overview: object.get("overview").map(value_as_text),
            key_concepts: object.get("keyConcepts").and_then(text_list),
            facts: object.get("facts").and_then(text_list),
            applications: object.get("applications").map(value_as_text),
        }
    }

    fn is_empty(&self) -> bool {
        self.overview.is_none()
            && self.key_concepts.is_none()
            && self.facts.is_none()
            && self.applications.is_none()
    }
}

/// Scalars render as text; containers render as an empty string
fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn text_list(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()
        .map(|items| items.iter().map(value_as_text).collect())
}

/// Parse the first JSON candidate in `text` into its recognized fields
fn parse_json_fields(text: &str) -> Option<JsonFields> {
    let (strategy, candidate) = find_json_candidate(text)?;
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(object)) => {
            debug!(strategy = strategy.as_str(), "Extracted JSON from completion");
            Some(JsonFields::from_object(&object))
        }
        Ok(_) => {
            warn!(strategy = strategy.as_str(), "JSON candidate is not an object");
            None
        }
        Err(e) => {
            warn!(
                strategy = strategy.as_str(),
                error = %e,
                "JSON candidate failed to parse, falling back to heuristics"
            );
            None
        }
    }
}

/// Links always point at the model's library page; a second one is added
/// when there is applications text to search for
pub fn related_links(model_name: &str, applications: Option<&str>) -> Vec<RelatedLink> {
    let mut links = vec![RelatedLink {
        title: format!("{}{}", MODEL_LINK_PREFIX, model_name),
        url: format!("{}{}", MODEL_LIBRARY_URL, model_name),
    }];

    if let Some(apps) = applications.filter(|a| !a.is_empty()) {
        let snippet: String = apps.chars().take(APPLICATIONS_SNIPPET_CHARS).collect();
        let encoded: String = url::form_urlencoded::byte_serialize(snippet.as_bytes()).collect();
        links.push(RelatedLink {
            title: APPLICATIONS_LINK_TITLE.to_string(),
            url: format!("{}{}", APPLICATIONS_SEARCH_URL, encoded),
        });
    }

    links
}

/// Turn a raw completion into a structured insight or an error result
pub fn normalize(raw: &RawCompletion) -> InsightResult {
    if let Some(err) = &raw.transport_error {
        return InsightResult::error(format!("Error calling the model API: {}", err));
    }
    if let Some(err) = &raw.model_error {
        return InsightResult::error(format!("Model error: {}", err));
    }

    let text = raw.text.as_deref().unwrap_or("");

    let (overview, key_concepts, facts, applications) = match parse_json_fields(text) {
        Some(fields) if fields.is_empty() => {
            debug!("JSON has no recognized fields, using full text as overview");
            (text.trim().to_string(), Vec::new(), None, None)
        }
        Some(fields) => (
            fields.overview.unwrap_or_default(),
            fields.key_concepts.unwrap_or_default(),
            fields.facts,
            fields.applications,
        ),
        None => {
            debug!(chars = text.len(), "No JSON in completion, using heuristic extraction");
            let fields = heuristic::extract(text);
            (
                fields.overview,
                fields.key_concepts,
                Some(fields.facts),
                Some(fields.applications),
            )
        }
    };

    let related_links = related_links(&raw.model_name, applications.as_deref());

    InsightResult::Success(Insight {
        overview,
        key_concepts,
        facts,
        applications,
        related_links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::heuristic::{
        APPLICATIONS_PLACEHOLDER, CONCEPT_PLACEHOLDER, FACT_PLACEHOLDER, OVERVIEW_PLACEHOLDER,
    };

    fn success(raw: &RawCompletion) -> Insight {
        match normalize(raw) {
            InsightResult::Success(insight) => insight,
            InsightResult::Error { message } => panic!("unexpected error: {}", message),
        }
    }

    #[test]
    fn test_transport_error_short_circuits() {
        let raw = RawCompletion::transport_failure("llama2", "connection refused");
        let result = normalize(&raw);
        assert!(result.is_error());
        assert!(result.error_message().unwrap().contains("connection refused"));
    }

    #[test]
    fn test_model_error_short_circuits() {
        let raw = RawCompletion {
            model_error: Some("model 'x' not found".into()),
            ..RawCompletion::completed("x", r#"{"overview":"ignored"}"#)
        };
        let result = normalize(&raw);
        assert_eq!(
            result.error_message(),
            Some("Model error: model 'x' not found")
        );
    }

    #[test]
    fn test_fenced_partial_json_is_not_backfilled() {
        let text = "Sure!\n```json\n{\"overview\":\"X\",\"keyConcepts\":[\"A\",\"B\"]}\n```\nEnjoy.";
        let insight = success(&RawCompletion::completed("llama2", text));
        assert_eq!(insight.overview, "X");
        assert_eq!(insight.key_concepts, vec!["A", "B"]);
        assert_eq!(insight.facts, None);
        assert_eq!(insight.applications, None);
        assert_eq!(insight.related_links.len(), 1);
    }

    #[test]
    fn test_full_json_without_fence() {
        let text = r#"{
  "overview": "Test overview",
  "keyConcepts": ["Concept 1", "Concept 2"],
  "facts": ["Fact 1", "Fact 2"],
  "applications": "Applied widely"
}"#;
        let insight = success(&RawCompletion::completed("llama2", text));
        assert_eq!(insight.overview, "Test overview");
        assert_eq!(insight.facts, Some(vec!["Fact 1".into(), "Fact 2".into()]));
        assert_eq!(insight.applications.as_deref(), Some("Applied widely"));
        assert_eq!(insight.related_links.len(), 2);
    }

    #[test]
    fn test_json_missing_key_concepts_gives_empty_list() {
        let insight = success(&RawCompletion::completed(
            "llama2",
            r#"Here: {"overview": "Only this"} done"#,
        ));
        assert_eq!(insight.overview, "Only this");
        assert!(insight.key_concepts.is_empty());
    }

    #[test]
    fn test_plain_text_uses_heuristics() {
        let text = "Para one.\n\nPara two.\n\n- Item one concept\n- Item two concept";
        let insight = success(&RawCompletion::completed("llama2", text));
        assert!(insight.overview.contains("Para one."));
        assert!(insight.overview.contains("Para two."));
        assert_eq!(insight.key_concepts, vec!["Item one concept", "Item two concept"]);
        assert_eq!(insight.facts, Some(vec![FACT_PLACEHOLDER.to_string()]));
        assert_eq!(insight.applications.as_deref(), Some(APPLICATIONS_PLACEHOLDER));
        assert_eq!(insight.related_links.len(), 2);
    }

    #[test]
    fn test_malformed_fenced_json_routes_to_heuristics() {
        let text = "```json\n{\"overview\": \"oops\",}\n```";
        let insight = success(&RawCompletion::completed("llama2", text));
        assert_eq!(insight.facts, Some(vec![FACT_PLACEHOLDER.to_string()]));
    }

    #[test]
    fn test_nested_json_without_fence_routes_to_heuristics() {
        // The non-greedy brace match stops at the first closing brace
        let text = r#"{"overview": "X", "meta": {"a": 1}, "keyConcepts": []}"#;
        let insight = success(&RawCompletion::completed("llama2", text));
        assert_eq!(insight.applications.as_deref(), Some(APPLICATIONS_PLACEHOLDER));
    }

    #[test]
    fn test_fenced_non_json_falls_through_to_brace_match() {
        let text = "```\nnot json\n```\nResult: {\"overview\": \"From braces\"}";
        let insight = success(&RawCompletion::completed("llama2", text));
        assert_eq!(insight.overview, "From braces");
    }

    #[test]
    fn test_json_without_recognized_fields_uses_text_as_overview() {
        let text = r#"{"summary": "something else"}"#;
        let insight = success(&RawCompletion::completed("llama2", text));
        assert_eq!(insight.overview, text);
        assert!(insight.key_concepts.is_empty());
        assert!(insight.facts.is_none());
    }

    #[test]
    fn test_scalar_values_rendered_as_text() {
        let text = r#"{"overview": 42, "keyConcepts": [true, "b"], "facts": "not a list"}"#;
        let insight = success(&RawCompletion::completed("llama2", text));
        assert_eq!(insight.overview, "42");
        assert_eq!(insight.key_concepts, vec!["true", "b"]);
        assert_eq!(insight.facts, None);
    }

    #[test]
    fn test_empty_text_is_not_an_error() {
        let raw = RawCompletion {
            text: None,
            ..RawCompletion::completed("llama2", "")
        };
        let insight = success(&raw);
        assert_eq!(insight.overview, OVERVIEW_PLACEHOLDER);
        assert_eq!(insight.key_concepts, vec![CONCEPT_PLACEHOLDER]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            RawCompletion::completed("llama2", "Para one.\n\n- Item one concept"),
            RawCompletion::completed("llama2", r#"```json {"overview":"X"} ```"#),
            RawCompletion::transport_failure("llama2", "timeout"),
        ];
        for raw in &inputs {
            assert_eq!(normalize(raw), normalize(raw));
        }
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(
            JSON_STRATEGIES,
            &[JsonStrategy::FencedBlock, JsonStrategy::BraceMatch]
        );
        assert_eq!(
            JsonStrategy::FencedBlock.extract("```json\n {\"a\":1} \n```"),
            Extraction::Matched("{\"a\":1}")
        );
        assert_eq!(JsonStrategy::BraceMatch.extract("no braces"), Extraction::NoMatch);
        assert_eq!(JsonStrategy::BraceMatch.extract("{bad}"), Extraction::NoMatch);
    }

    #[test]
    fn test_related_links() {
        let links = related_links("llama2", None);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].title, "Additional information about llama2");
        assert_eq!(links[0].url, "https://ollama.com/library/llama2");

        assert_eq!(related_links("llama2", Some("")).len(), 1);

        let links = related_links("llama2", Some("Used in solar panels and more"));
        assert_eq!(links.len(), 2);
        assert_eq!(
            links[1].url,
            "https://example.com/search?q=examples+Used+in+solar+panels"
        );
    }

    #[test]
    fn test_related_link_snippet_counts_chars() {
        let links = related_links("m", Some("éééééééééééééééééééééééé"));
        let expected: String =
            url::form_urlencoded::byte_serialize("é".repeat(20).as_bytes()).collect();
        assert!(links[1].url.ends_with(&expected));
    }
}
