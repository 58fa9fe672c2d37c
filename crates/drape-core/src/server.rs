//! HTTP relay exposing the analyzer to browser clients.
//!
//! Routes:
//! - `POST /api/analyze` - multipart upload, returns tags, colors and
//!   recommendations
//! - `GET /health` - liveness

use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::analyzer::Analyzer;
use crate::config::Config;
use crate::error::{AnalyzeError, DrapeError};
use crate::types::AnalysisResult;
use crate::VERSION;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    /// Multipart field carrying the image
    pub upload_field: String,
}

impl AppState {
    pub fn new(analyzer: Analyzer, upload_field: impl Into<String>) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            upload_field: upload_field.into(),
        }
    }
}

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    /// The multipart body could not be read
    BadMultipart(StatusCode, String),
    /// The analysis flow failed
    Analyze(AnalyzeError),
    /// The upload could not be staged locally
    Staging(std::io::Error),
}

impl From<AnalyzeError> for ApiError {
    fn from(err: AnalyzeError) -> Self {
        Self::Analyze(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadMultipart(status, msg) => {
                tracing::warn!("Rejected upload: {msg}");
                (status, json!({ "error": msg }))
            }
            ApiError::Analyze(err @ AnalyzeError::MissingInput) => {
                (StatusCode::BAD_REQUEST, json!({ "error": err.to_string() }))
            }
            ApiError::Analyze(err @ AnalyzeError::MisconfiguredService { .. }) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
            ApiError::Analyze(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Image analysis failed", "details": err.to_string() }),
            ),
            ApiError::Staging(err) => {
                tracing::error!("Failed to stage upload: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": "Image analysis failed", "details": err.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Build the router with CORS, request tracing and the upload size limit.
pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze_upload))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": VERSION,
        "configured": state.analyzer.is_configured(),
    }))
}

async fn analyze_upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResult>, ApiError> {
    // A body that isn't multipart at all carries no file either.
    let Ok(mut multipart) = multipart else {
        return Err(AnalyzeError::MissingInput.into());
    };

    let mut image: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadMultipart(e.status(), format!("Multipart error: {}", e.body_text())))?
    {
        if field.name() != Some(state.upload_field.as_str()) {
            continue;
        }
        // A plain text field under the upload name is not a file.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadMultipart(e.status(), format!("Read error: {}", e.body_text())))?;

        // Browsers send an empty part when no file was picked.
        if !bytes.is_empty() {
            image = Some((file_name, content_type, bytes.to_vec()));
        }
    }

    let (file_name, content_type, bytes) = image.ok_or(AnalyzeError::MissingInput)?;

    let upload = state
        .analyzer
        .store()
        .stage(&file_name, content_type, &bytes)
        .await
        .map_err(ApiError::Staging)?;
    drop(bytes);

    let result = state.analyzer.analyze(upload).await?;
    Ok(Json(result))
}

/// Run the relay until Ctrl-C.
pub async fn serve(config: &Config) -> Result<(), DrapeError> {
    let analyzer = Analyzer::from_config(config);
    let state = AppState::new(analyzer, config.server.upload_field.clone());
    let max_bytes = (config.server.max_upload_mb as usize).saturating_mul(1024 * 1024);
    let app = router(state, max_bytes);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            crate::error::ConfigError::ValidationError(format!(
                "invalid listen address {}:{}: {e}",
                config.server.host, config.server.port
            ))
        })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Drape v{} listening on http://{}", VERSION, listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
