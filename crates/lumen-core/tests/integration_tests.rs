//! Integration tests for lumen-core
//!
//! These tests run the real Ollama backend against the mock Ollama server
//! and exercise the full topic → prompt → generate → normalize workflow.

use std::io::Write;
use std::time::Duration;

use lumen_core::{
    config::{ConfigOverrides, DefaultedSetting, LumenConfig},
    insight::{APPLICATIONS_PLACEHOLDER, FACT_PLACEHOLDER},
    test_utils::{MockGenerate, MockOllamaServer},
    AIClient, CompletionBackend, Error, InsightService, OllamaBackend,
};

fn service_for(server: &MockOllamaServer) -> InsightService {
    InsightService::new(AIClient::ollama(&server.url(), "llama2"))
}

// =============================================================================
// Gateway Tests
// =============================================================================

#[tokio::test]
async fn test_generate_returns_envelope() {
    let server = MockOllamaServer::start().await;
    let backend = OllamaBackend::new(&server.url(), "llama2");

    let raw = backend.generate("Explain tides").await.unwrap();

    assert_eq!(raw.model_name, "llama2");
    assert!(raw.is_complete);
    assert!(raw.text.unwrap().contains("```json"));
    assert!(raw.model_error.is_none());

    let request = server.last_request().expect("request recorded");
    assert_eq!(request.model, "llama2");
    assert_eq!(request.prompt, "Explain tides");
    assert!(!request.stream);
}

#[tokio::test]
async fn test_generate_http_error_carries_ollama_message() {
    let server =
        MockOllamaServer::start_with(MockGenerate::HttpError(404, "model 'nope' not found".into()))
            .await;
    let backend = OllamaBackend::new(&server.url(), "nope");

    let err = backend.generate("Explain tides").await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "model 'nope' not found");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_times_out() {
    let server = MockOllamaServer::start_with(MockGenerate::Slow(Duration::from_secs(3))).await;
    let backend =
        OllamaBackend::with_timeout(&server.url(), "llama2", Duration::from_millis(200)).unwrap();

    let err = backend.generate("Explain tides").await.unwrap_err();
    assert!(matches!(err, Error::Http(ref e) if e.is_timeout()));
}

#[tokio::test]
async fn test_health_check_against_mock_server() {
    let server = MockOllamaServer::start().await;
    let backend = OllamaBackend::new(&server.url(), "llama2");
    assert!(backend.health_check().await);
}

// =============================================================================
// End-to-end Insight Tests
// =============================================================================

#[tokio::test]
async fn test_insight_from_fenced_json() {
    let server = MockOllamaServer::start().await;
    let service = service_for(&server);

    let result = service.get_insights_for("Tides").await.unwrap();
    let insight = result.insight().expect("success");

    assert_eq!(
        insight.overview,
        "Tides are the periodic rise and fall of sea levels."
    );
    assert_eq!(
        insight.key_concepts,
        vec!["Gravitational pull of the moon", "Rotation of the earth"]
    );
    assert_eq!(
        insight.facts.as_deref(),
        Some(&["Most coasts see two high tides a day".to_string()][..])
    );
    assert_eq!(insight.applications.as_deref(), Some("Tidal power generation"));
    assert_eq!(insight.related_links.len(), 2);
    assert_eq!(
        insight.related_links[0].url,
        "https://ollama.com/library/llama2"
    );
    assert_eq!(
        insight.related_links[1].url,
        "https://example.com/search?q=examples+Tidal+power+generati"
    );

    let prompt = server.last_request().unwrap().prompt;
    assert!(prompt.contains("'Tides'"));
    assert_eq!(server.generate_calls(), 1);
}

#[tokio::test]
async fn test_insight_from_plain_prose() {
    let prose = "Photosynthesis converts light into chemical energy and sustains nearly all life on the planet we live on.\n\nIt happens in chloroplasts.";
    let server = MockOllamaServer::start_with(MockGenerate::Text(prose.into())).await;
    let service = service_for(&server);

    let result = service.get_insights_for("Photosynthesis").await.unwrap();
    let insight = result.insight().expect("success");

    assert!(insight.overview.starts_with("Photosynthesis converts light"));
    assert!(!insight.overview.contains("chloroplasts"));
    assert_eq!(
        insight.facts.as_deref(),
        Some(&[FACT_PLACEHOLDER.to_string()][..])
    );
    assert_eq!(insight.applications.as_deref(), Some(APPLICATIONS_PLACEHOLDER));
}

#[tokio::test]
async fn test_insight_model_error() {
    let server =
        MockOllamaServer::start_with(MockGenerate::ModelError("out of memory".into())).await;
    let service = service_for(&server);

    let result = service.get_insights_for("Tides").await.unwrap();
    assert_eq!(result.error_message(), Some("Model error: out of memory"));
}

#[tokio::test]
async fn test_insight_http_error_is_error_result() {
    let server =
        MockOllamaServer::start_with(MockGenerate::HttpError(500, "server exploded".into())).await;
    let service = service_for(&server);

    let result = service.get_insights_for("Tides").await.unwrap();
    let message = result.error_message().expect("error result");
    assert!(message.starts_with("Error calling the model API:"));
    assert!(message.contains("server exploded"));
}

#[tokio::test]
async fn test_insight_unreachable_server() {
    let service = InsightService::new(AIClient::ollama("http://127.0.0.1:1", "llama2"));

    let result = service.get_insights_for("Tides").await.unwrap();
    assert!(result
        .error_message()
        .unwrap()
        .starts_with("Error calling the model API:"));
}

#[tokio::test]
async fn test_empty_topic_makes_no_request() {
    let server = MockOllamaServer::start().await;
    let service = service_for(&server);

    assert!(service.get_insights_for("").await.is_err());
    assert_eq!(server.generate_calls(), 0);
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_config_file_feeds_backend() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[ollama]\napi_url = \"gpu-box:11434/\"\nmodel = \"mistral\"\ntimeout_secs = 30"
    )
    .unwrap();

    let overrides = ConfigOverrides {
        model: Some("phi3".into()),
        ..Default::default()
    };
    let config = LumenConfig::load(Some(file.path()))
        .unwrap()
        .apply_overrides(&overrides)
        .resolve();

    assert_eq!(config.model, "phi3");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert!(!config.is_defaulted(DefaultedSetting::Model));

    let backend = OllamaBackend::from_config(&config).unwrap();
    assert_eq!(backend.model(), "phi3");
    assert_eq!(backend.host(), "http://gpu-box:11434");
}
