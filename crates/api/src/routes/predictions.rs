//! Prediction Routes
//!
//! Each handler binds the JSON body to a raw record and hands it to the
//! prediction service. Predictions are short CPU-bound work and run inline.

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use prediction_service::{
    EfficiencyPrediction, FeatureRecord, LifespanPrediction, OptimalRpmPrediction,
    PredictionError, Task,
};
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::telemetry::observe;
use crate::AppState;

/// Accept only a JSON object as a feature record
fn into_record(body: Result<Json<Value>, JsonRejection>) -> Result<FeatureRecord, PredictionError> {
    match body {
        Ok(Json(Value::Object(record))) => Ok(record),
        Ok(Json(_)) => Err(PredictionError::Validation {
            field: "body",
            reason: "expected a JSON object".to_string(),
        }),
        Err(rejection) => Err(PredictionError::Validation {
            field: "body",
            reason: rejection.body_text(),
        }),
    }
}

/// Predict optimal RPM and energy usage at that speed
pub async fn predict_optimal_rpm(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<OptimalRpmPrediction>, ApiError> {
    let prediction = observe(Task::OptimalRpm, || {
        state.service.predict_optimal_rpm(&into_record(body)?)
    })?;
    Ok(Json(prediction))
}

/// Predict efficiency percentage
pub async fn predict_efficiency(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EfficiencyPrediction>, ApiError> {
    let prediction = observe(Task::Efficiency, || {
        state.service.predict_efficiency(&into_record(body)?)
    })?;
    Ok(Json(prediction))
}

/// Predict remaining lifespan in years
pub async fn predict_lifespan(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<LifespanPrediction>, ApiError> {
    let prediction = observe(Task::Lifespan, || {
        state.service.predict_lifespan(&into_record(body)?)
    })?;
    Ok(Json(prediction))
}
