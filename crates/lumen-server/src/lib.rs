//! Lumen Web Server
//!
//! Axum-based REST API in front of the insight pipeline.
//!
//! - Restrictive CORS policy (same-origin unless origins are configured)
//! - Topic validation before any model call
//! - Uniform `{"error": true, "message": ...}` error bodies

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{info, warn};

use lumen_core::{AIClient, CompletionBackend, InsightService, ResolvedConfig};

mod handlers;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub insights: InsightService,
    /// Resolved model configuration, reported by the status endpoint
    pub config: ResolvedConfig,
    pub server: ServerConfig,
}

impl AppState {
    pub fn new(insights: InsightService, config: ResolvedConfig, server: ServerConfig) -> Self {
        Self {
            insights,
            config,
            server,
        }
    }
}

/// Build the router around an already constructed state
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.server);
    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/insights", post(handlers::post_insights))
        .route("/insights/generate", post(handlers::generate_insights))
        .route("/insights/status", get(handlers::insight_status));

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
}

fn build_cors(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origins.is_empty() {
        return cors;
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}

/// Start the server with default server options
pub async fn serve(host: &str, port: u16, config: ResolvedConfig) -> anyhow::Result<()> {
    serve_with_config(host, port, config, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    host: &str,
    port: u16,
    config: ResolvedConfig,
    server: ServerConfig,
) -> anyhow::Result<()> {
    config.warn_defaults();

    let client = AIClient::from_config(&config)?;
    check_ai_connection(&client).await;

    let state = AppState::new(InsightService::new(client), config, server);
    let app = create_router(state);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
///
/// The server starts either way; requests fail individually while the
/// backend is down.
async fn check_ai_connection(client: &AIClient) {
    if let AIClient::Mock(_) = client {
        info!("ℹ️  Using mock AI backend (AI_BACKEND=mock)");
        return;
    }

    if client.health_check().await {
        info!(
            "✅ AI backend connected: {} (model: {})",
            client.host(),
            client.model()
        );
    } else {
        warn!(
            "⚠️  AI backend configured but not responding: {} (model: {})",
            client.host(),
            client.model()
        );
    }
}

// ============================================================================
// Error Handling
// ============================================================================

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": true,
            "message": self.message
        }));

        (self.status, body).into_response()
    }
}
