//! Prompt builder for topic insights

use super::types::Topic;

/// Build the generate prompt for a topic
///
/// Pure and deterministic: the same topic always yields the same text. The
/// prompt asks for a fenced JSON object with `overview`, `keyConcepts`, `facts`
/// and `applications`, which is what the normalizer looks for first.
pub fn build_prompt(topic: &Topic) -> String {
    format!(
        "You are a knowledgeable analytical assistant. Your task is to provide a structured, \
informative analysis of the topic '{topic}'.

Respond in the following JSON format (it is important to follow this format exactly):
```json
{{
  \"overview\": \"A thorough 2-3 paragraph overview of the topic covering its definition, history, significance and relevance.\",
  \"keyConcepts\": [\"Concept 1 with a short explanation\", \"Concept 2 with a short explanation\", ...],
  \"facts\": [\"Interesting fact 1\", \"Interesting fact 2\", ...],
  \"applications\": \"A description of practical applications or the real-world significance of the topic\"
}}
```

The answer must be accurate, informative and well-founded. Use current information. \
Do not include information you are not sure about.",
        topic = topic.as_str()
    )
}
