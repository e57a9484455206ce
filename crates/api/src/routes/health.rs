//! Health Routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use model_registry::BindingSummary;
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// Fixed availability message served on `/`
pub const ROOT_MESSAGE: &str = "Cooling system prediction API is running!";

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub models: Vec<BindingSummary>,
}

/// Availability check
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse { message: ROOT_MESSAGE })
}

/// Health check with loaded model summary
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        models: state.service.registry().summaries(),
    })
}

/// Prometheus scrape endpoint
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
