//! Cooling-System Prediction Gateway
//!
//! HTTP adapter over the prediction service: one POST route per task, a
//! health check, and Prometheus metrics.

use anyhow::{anyhow, Context, Result};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use model_registry::ModelRegistry;
use prediction_service::PredictionService;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};

pub mod config;
pub mod error;
pub mod telemetry;
pub mod rate_limit;
mod routes;

pub use crate::config::{GatewayConfig, LogFormat};
pub use routes::health::ROOT_MESSAGE;

/// Application state shared across handlers.
///
/// Read-only after startup, so handlers share it without locking.
pub struct AppState {
    /// Prediction service over the loaded registry
    pub service: PredictionService,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus handle when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(service: PredictionService) -> Self {
        Self {
            service,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::health::root))
        .route("/api/v1/health", get(routes::health::health))
        .route("/metrics", get(routes::health::metrics))
        .route("/predict_optimalRPM/", post(routes::predictions::predict_optimal_rpm))
        .route("/predict_efficiency/", post(routes::predictions::predict_efficiency))
        .route("/predict_lifespan/", post(routes::predictions::predict_lifespan))
        .with_state(state)
}

/// CORS policy; an empty origin list allows any origin
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin: {}", o)))
        .collect::<Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

/// Router with rate limiting (if enabled), CORS and tracing applied.
///
/// The limiter sits inside CORS so rejected requests still carry CORS headers.
pub fn build_app(state: Arc<AppState>, config: &GatewayConfig) -> Result<Router> {
    let mut app = create_router(state);
    if config.rate_limit.enabled {
        app = app.layer(rate_limit::governor_layer(&config.rate_limit)?);
    }

    Ok(app
        .layer(cors_layer(&config.cors_allowed_origins)?)
        .layer(TraceLayer::new_for_http()))
}

/// Initialize logging
pub fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let level: Level = level
        .parse()
        .map_err(|_| anyhow!("invalid log level: {}", level))?;
    let builder = tracing_subscriber::fmt().with_max_level(level).with_target(true);

    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
    .map_err(|e| anyhow!("failed to set tracing subscriber: {}", e))
}

/// Load the models and serve until the listener fails.
///
/// A missing or malformed artifact aborts startup.
pub async fn run_server(config: GatewayConfig) -> Result<()> {
    let registry = ModelRegistry::load(&config.artifact_dir)
        .with_context(|| format!("loading models from {}", config.artifact_dir.display()))?;
    let service = PredictionService::new(Arc::new(registry), config.service_config());

    let mut state = AppState::new(service);
    if config.metrics_enabled {
        state = state.with_metrics(telemetry::install_recorder()?);
    }

    let app = build_app(Arc::new(state), &config)?;

    info!("Starting API server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
