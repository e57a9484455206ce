//! Prediction Error Types

use model_registry::RegistryError;
use serde::Serialize;
use thiserror::Error;

/// Machine-readable error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ValidationError,
    DivisionByZero,
    NumericInstability,
    Internal,
}

impl ErrorKind {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::DivisionByZero => "division_by_zero",
            ErrorKind::NumericInstability => "numeric_instability",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Errors returned by a prediction request
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Missing field or value of the wrong type
    #[error("Invalid field {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A divisor input was zero
    #[error("{field} must be non-zero")]
    DivisionByZero { field: &'static str },

    /// An input or computed output was NaN or infinite
    #[error("{field} is not finite ({value})")]
    NumericInstability { field: &'static str, value: f64 },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl PredictionError {
    pub(crate) fn missing(field: &'static str) -> Self {
        PredictionError::Validation {
            field,
            reason: "field required".to_string(),
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        PredictionError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Error category
    pub fn kind(&self) -> ErrorKind {
        match self {
            PredictionError::Validation { .. } => ErrorKind::ValidationError,
            PredictionError::DivisionByZero { .. } => ErrorKind::DivisionByZero,
            PredictionError::NumericInstability { .. } => ErrorKind::NumericInstability,
            PredictionError::Registry(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller can fix the request
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::ValidationError | ErrorKind::DivisionByZero)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(PredictionError::missing("pressure").kind(), ErrorKind::ValidationError);
        assert_eq!(
            PredictionError::DivisionByZero { field: "motor_speed" }.kind(),
            ErrorKind::DivisionByZero
        );
        let unstable = PredictionError::NumericInstability {
            field: "Optimal RPM",
            value: f64::NAN,
        };
        assert_eq!(unstable.kind(), ErrorKind::NumericInstability);
        assert!(!unstable.is_client_error());
        let internal: PredictionError = RegistryError::UnknownTask("x".to_string()).into();
        assert_eq!(internal.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_messages() {
        let err = PredictionError::missing("vibration");
        assert_eq!(err.to_string(), "Invalid field vibration: field required");
        assert_eq!(ErrorKind::NumericInstability.as_str(), "numeric_instability");
        let unstable = PredictionError::NumericInstability {
            field: "motor_speed",
            value: f64::INFINITY,
        };
        assert_eq!(unstable.to_string(), "motor_speed is not finite (inf)");
    }
}
