//! Insight handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AppError, AppState};
use lumen_core::{
    CompletionBackend, DefaultedSetting, Error as CoreError, InsightResult, Topic,
};

/// Request body for POST /api/insights
#[derive(Debug, Deserialize)]
pub struct InsightRequest {
    pub topic: Option<String>,
}

/// Request body for POST /api/insights/generate
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub topic: Option<String>,
    /// Accepted for compatibility; generation takes no parameters
    #[serde(default)]
    pub parameters: Option<serde_json::Value>,
}

/// Response for GET /api/insights/status
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightStatus {
    pub host: String,
    pub model: String,
    pub timeout_secs: u64,
    pub defaulted: Vec<DefaultedSetting>,
    pub available: bool,
}

type InsightResponse = (StatusCode, Json<InsightResult>);

/// Validate the topic field of a request body
fn parse_topic(topic: Option<&str>) -> Result<Topic, AppError> {
    match Topic::parse(topic.unwrap_or_default()) {
        Ok(topic) => Ok(topic),
        Err(CoreError::Validation(msg)) => Err(AppError::bad_request(&msg)),
        Err(e) => Err(AppError::bad_request(&e.to_string())),
    }
}

/// Turn a JSON extraction failure into a 400
fn reject(rejection: JsonRejection) -> AppError {
    debug!(error = %rejection.body_text(), "Rejected request body");
    AppError::bad_request(&format!("Invalid request body: {}", rejection.body_text()))
}

async fn respond(state: &AppState, topic: &Topic) -> InsightResponse {
    let result = state.insights.get_insights(topic).await;
    let status = if result.is_error() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    (status, Json(result))
}

/// POST /api/insights - Generate insights for a topic
pub async fn post_insights(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InsightRequest>, JsonRejection>,
) -> Result<InsightResponse, AppError> {
    let Json(request) = body.map_err(reject)?;
    let topic = parse_topic(request.topic.as_deref())?;
    Ok(respond(&state, &topic).await)
}

/// POST /api/insights/generate - Same as /api/insights, with an ignored `parameters` object
pub async fn generate_insights(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<InsightResponse, AppError> {
    let Json(request) = body.map_err(reject)?;
    if request.parameters.is_some() {
        debug!("Ignoring generation parameters");
    }
    let topic = parse_topic(request.topic.as_deref())?;
    Ok(respond(&state, &topic).await)
}

/// GET /api/insights/status - Backend reachability and effective configuration
pub async fn insight_status(State(state): State<Arc<AppState>>) -> Json<InsightStatus> {
    let backend = state.insights.backend();
    Json(InsightStatus {
        host: backend.host().to_string(),
        model: backend.model().to_string(),
        timeout_secs: state.config.timeout.as_secs(),
        defaulted: state.config.defaulted.clone(),
        available: backend.health_check().await,
    })
}
