//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use prediction_service::{ErrorKind, PredictionError};
use serde::Serialize;

/// Prediction failure rendered as a structured JSON body
#[derive(Debug)]
pub struct ApiError(pub PredictionError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    kind: ErrorKind,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::DivisionByZero => StatusCode::BAD_REQUEST,
            ErrorKind::NumericInstability | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.0.kind(),
                message: self.0.to_string(),
            },
        };
        (self.status(), Json(body)).into_response()
    }
}
