//! Model Registry
//!
//! Holds the fitted (scaler, regressor) pair for each cooling-system prediction task.
//! Bindings are loaded once from JSON artifacts and are read-only afterwards.

mod artifact;
mod predictor;
mod registry;
mod scaler;
mod task;

pub use artifact::{load_model, load_scaler, model_path, scaler_path, ModelArtifact};
pub use predictor::{
    Activation, DecisionTree, DenseLayer, LinearModel, Mlp, RandomForest, Regressor,
};
pub use registry::{BindingSummary, ModelBinding, ModelRegistry};
pub use scaler::StandardScaler;
pub use task::Task;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or querying the registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown task: {0}")]
    UnknownTask(String),
    #[error("Artifact missing: {}", path.display())]
    ArtifactMissing { path: PathBuf },
    #[error("Artifact malformed: {}: {reason}", path.display())]
    ArtifactMalformed { path: PathBuf, reason: String },
    #[error("Schema mismatch for {task}: {reason}")]
    SchemaMismatch { task: Task, reason: String },
    #[error("No binding registered for task {0}")]
    MissingBinding(Task),
    #[error("Duplicate binding for task {0}")]
    DuplicateBinding(Task),
    #[error("Invalid input shape: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}
