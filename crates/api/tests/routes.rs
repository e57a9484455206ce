//! Router tests against the fixture artifacts in `fixtures/models`.

use api::rate_limit::RateLimitConfig;
use api::{build_app, create_router, AppState, GatewayConfig, ROOT_MESSAGE};
use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use model_registry::ModelRegistry;
use prediction_service::{PredictionService, ServiceConfig, TimeOfDayPolicy};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/models")
}

fn state_with(config: ServiceConfig) -> Arc<AppState> {
    let registry = ModelRegistry::load(fixture_dir()).expect("fixture artifacts load");
    let service = PredictionService::new(Arc::new(registry), config);
    Arc::new(AppState::new(service))
}

fn app_with(config: ServiceConfig) -> Router {
    create_router(state_with(config))
}

fn app() -> Router {
    app_with(ServiceConfig::default())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

async fn post(app: Router, uri: &str, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

fn optimal_rpm_body() -> Value {
    json!({
        "flow_rate": 1200.0,
        "inlet_temperature": 40.0,
        "outlet_temperature": 32.0,
        "delta_temperature": 8.0,
        "pressure": 3.0,
        "delta_pressure": 0.2,
        "power_consumption": 25.0,
        "vibration": 0.5,
        "ambient_temperature": 32.0,
        "time_of_day": "Peak",
        "cooling_load": 50.0,
        "motor_speed": 1500.0,
        "energy_usage_regular_rpm": 40.0
    })
}

fn lifespan_body() -> Value {
    json!({
        "delta_temperature": 10,
        "pressure": 3,
        "delta_pressure": 0.2,
        "power_consumption": 25,
        "cooling_load": 50,
        "motor_speed": 1400,
        "vibration": 0.5,
        "ambient_temperature": 32
    })
}

#[test]
fn test_fixture_registry_bindings() {
    let registry = ModelRegistry::load(fixture_dir()).unwrap();
    let kinds: Vec<&str> = registry.summaries().iter().map(|s| s.model_kind).collect();
    assert_eq!(kinds, vec!["random_forest", "mlp", "mlp"]);
}

#[tokio::test]
async fn test_root_message() {
    let (status, body) = get(app(), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": ROOT_MESSAGE }));
}

#[tokio::test]
async fn test_health_lists_models() {
    let (status, body) = get(app(), "/api/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    let models = body["models"].as_array().unwrap();
    assert_eq!(models.len(), 3);
    assert_eq!(models[0]["task"], "optimal_rpm");
    assert_eq!(models[0]["n_features"], 13);
}

#[tokio::test]
async fn test_predict_optimal_rpm() {
    let (status, body) = post(app(), "/predict_optimalRPM/", optimal_rpm_body().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["Optimal RPM"], 1275.0);
    assert_eq!(body["Energy Usage (Regular RPM) (kW)"], 40.0);
    let energy = body["Energy Usage (Optimal RPM) (kW)"].as_f64().unwrap();
    assert!((energy - 28.9).abs() < 1e-9);
}

#[tokio::test]
async fn test_zero_motor_speed_is_bad_request() {
    let mut body = optimal_rpm_body();
    body["motor_speed"] = json!(0);
    let (status, body) = post(app(), "/predict_optimalRPM/", body.to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "division_by_zero");
}

#[tokio::test]
async fn test_missing_field_is_unprocessable() {
    let mut body = optimal_rpm_body();
    body.as_object_mut().unwrap().remove("cooling_load");
    let (status, body) = post(app(), "/predict_optimalRPM/", body.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "validation_error");
    assert!(body["error"]["message"].as_str().unwrap().contains("cooling_load"));
}

#[tokio::test]
async fn test_non_numeric_field_is_unprocessable() {
    let mut body = lifespan_body();
    body["pressure"] = json!("high");
    let (status, body) = post(app(), "/predict_lifespan/", body.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "validation_error");
}

#[tokio::test]
async fn test_non_object_body_is_unprocessable() {
    let (status, body) = post(app(), "/predict_efficiency/", "[1, 2, 3]".to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "validation_error");

    let (status, body) = post(app(), "/predict_efficiency/", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "validation_error");
}

#[tokio::test]
async fn test_predict_efficiency() {
    let mut body = optimal_rpm_body();
    body.as_object_mut().unwrap().remove("time_of_day");
    let (status, body) = post(app(), "/predict_efficiency/", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "Efficiency Percentage": 81.0 }));
}

#[tokio::test]
async fn test_predict_lifespan() {
    let (status, body) = post(app(), "/predict_lifespan/", lifespan_body().to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "Remaining Lifespan (years)": 5.0 }));
}

#[tokio::test]
async fn test_non_finite_strings_are_numeric_instability() {
    let cases = [
        ("/predict_optimalRPM/", optimal_rpm_body(), "flow_rate", "NaN"),
        ("/predict_optimalRPM/", optimal_rpm_body(), "motor_speed", "inf"),
        ("/predict_optimalRPM/", optimal_rpm_body(), "cooling_load", "-inf"),
        ("/predict_lifespan/", lifespan_body(), "vibration", "NaN"),
    ];
    for (uri, mut body, field, raw) in cases {
        body[field] = json!(raw);
        let (status, body) = post(app(), uri, body.to_string()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{field}={raw}: {body}");
        assert_eq!(body["error"]["kind"], "numeric_instability");
        assert!(body["error"]["message"].as_str().unwrap().starts_with(field));
    }
}

#[tokio::test]
async fn test_unknown_time_of_day() {
    let mut body = optimal_rpm_body();
    body["time_of_day"] = json!("Evening");

    let (status, _) = post(app(), "/predict_optimalRPM/", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let strict = app_with(ServiceConfig {
        time_of_day_policy: TimeOfDayPolicy::Strict,
    });
    let (status, body) = post(strict, "/predict_optimalRPM/", body.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["kind"], "validation_error");
}

#[tokio::test]
async fn test_metrics_disabled_without_recorder() {
    let (status, _) = get(app(), "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cors_preflight() {
    let config = GatewayConfig::default();
    let app = app().layer(api::cors_layer(&config.cors_allowed_origins).unwrap());
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/predict_lifespan/")
        .header(header::ORIGIN, "https://dashboard.example.com")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

fn peer_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::ORIGIN, "https://dashboard.example.com")
        .extension(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 40000))))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_built_app_reports_rate_limit_headers() {
    let app = build_app(state_with(ServiceConfig::default()), &GatewayConfig::default()).unwrap();
    let response = app.oneshot(peer_request("/api/v1/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-ratelimit-limit"));
    assert!(response.headers().contains_key("x-ratelimit-remaining"));
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_rate_limited_response_keeps_cors_headers() {
    let config = GatewayConfig {
        rate_limit: RateLimitConfig {
            enabled: true,
            per_second: 60,
            burst_size: 1,
        },
        ..Default::default()
    };
    let app = build_app(state_with(ServiceConfig::default()), &config).unwrap();

    let first = app.clone().oneshot(peer_request("/")).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(peer_request("/")).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        second.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_built_app_without_rate_limit() {
    let mut config = GatewayConfig::default();
    config.rate_limit.enabled = false;
    let app = build_app(state_with(ServiceConfig::default()), &config).unwrap();
    let (status, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": ROOT_MESSAGE }));
}
