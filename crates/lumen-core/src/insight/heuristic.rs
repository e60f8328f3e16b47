//! Rule-based extraction for completions that carry no usable JSON

use std::sync::OnceLock;

use regex::Regex;

/// Overview used when the text has no paragraphs at all
pub const OVERVIEW_PLACEHOLDER: &str = "Could not generate an overview for the requested topic.";

/// Concept used when neither list items nor sentences qualify
pub const CONCEPT_PLACEHOLDER: &str = "No key concepts identified.";

/// The heuristic path does not try to find facts
pub const FACT_PLACEHOLDER: &str = "No interesting facts identified.";

/// The heuristic path does not try to find applications
pub const APPLICATIONS_PLACEHOLDER: &str =
    "No information about practical applications identified.";

/// A first paragraph shorter than this gets the second one appended
const SHORT_PARAGRAPH_CHARS: usize = 100;

const MAX_LIST_CONCEPTS: usize = 7;
const MIN_LIST_CONCEPT_CHARS: usize = 10;

const MAX_SENTENCE_CONCEPTS: usize = 5;
const MIN_SENTENCE_CHARS: usize = 20;
const MAX_SENTENCE_CHARS: usize = 120;

fn paragraph_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\r?\n[ \t]*\r?\n").expect("valid regex"))
}

fn list_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*[•*\-][ \t]+(.+)$").expect("valid regex"))
}

/// Everything the heuristic path produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicFields {
    pub overview: String,
    pub key_concepts: Vec<String>,
    pub facts: Vec<String>,
    pub applications: String,
}

/// Run every heuristic over the completion text
pub fn extract(text: &str) -> HeuristicFields {
    HeuristicFields {
        overview: extract_overview(text),
        key_concepts: extract_key_concepts(text),
        facts: vec![FACT_PLACEHOLDER.to_string()],
        applications: APPLICATIONS_PLACEHOLDER.to_string(),
    }
}

/// Non-empty, trimmed paragraphs separated by blank lines
fn paragraphs(text: &str) -> Vec<&str> {
    paragraph_break()
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// First paragraph, or the first two when the first one is short
pub fn extract_overview(text: &str) -> String {
    match paragraphs(text).as_slice() {
        [] => OVERVIEW_PLACEHOLDER.to_string(),
        [first, second, ..] if first.chars().count() < SHORT_PARAGRAPH_CHARS => {
            format!("{}\n\n{}", first, second)
        }
        [first, ..] => first.to_string(),
    }
}

/// Bulleted lines first, then mid-length sentences, then a placeholder
pub fn extract_key_concepts(text: &str) -> Vec<String> {
    let from_list: Vec<String> = list_item()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|item| item.chars().count() > MIN_LIST_CONCEPT_CHARS)
        .take(MAX_LIST_CONCEPTS)
        .map(str::to_string)
        .collect();

    if !from_list.is_empty() {
        return from_list;
    }

    let from_sentences: Vec<String> = text
        .split(". ")
        .map(str::trim)
        .filter(|s| {
            let len = s.chars().count();
            len > MIN_SENTENCE_CHARS && len < MAX_SENTENCE_CHARS
        })
        .take(MAX_SENTENCE_CONCEPTS)
        .map(|s| format!("{}.", s))
        .collect();

    if !from_sentences.is_empty() {
        return from_sentences;
    }

    vec![CONCEPT_PLACEHOLDER.to_string()]
}
