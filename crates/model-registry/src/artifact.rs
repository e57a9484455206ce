//! On-disk artifact format
//!
//! Each task has two JSON files in the artifact directory:
//! `<task>.scaler.json` (a [`StandardScaler`]) and `<task>.model.json`
//! (a [`ModelArtifact`]).

use crate::predictor::{
    Activation, DecisionTree, DenseLayer, LinearModel, Mlp, RandomForest, Regressor,
};
use crate::scaler::StandardScaler;
use crate::task::Task;
use crate::RegistryError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Serialized predictor, tagged by model family
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    RandomForest {
        trees: Vec<DecisionTree>,
    },
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    Mlp {
        activation: Activation,
        layers: Vec<DenseLayer>,
    },
}

impl ModelArtifact {
    /// Build the runtime regressor for a task with `n_features` inputs
    pub fn into_regressor(self, n_features: usize) -> Result<Box<dyn Regressor>, String> {
        Ok(match self {
            ModelArtifact::RandomForest { trees } => {
                Box::new(RandomForest::new(trees, n_features)?)
            }
            ModelArtifact::Linear {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != n_features {
                    return Err(format!(
                        "{} coefficients for {} features",
                        coefficients.len(),
                        n_features
                    ));
                }
                Box::new(LinearModel::new(coefficients, intercept)?)
            }
            ModelArtifact::Mlp { activation, layers } => {
                Box::new(Mlp::new(activation, layers, n_features)?)
            }
        })
    }
}

/// Path of a task's scaler artifact
pub fn scaler_path(dir: &Path, task: Task) -> PathBuf {
    dir.join(format!("{}.scaler.json", task.as_str()))
}

/// Path of a task's model artifact
pub fn model_path(dir: &Path, task: Task) -> PathBuf {
    dir.join(format!("{}.model.json", task.as_str()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, RegistryError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => RegistryError::ArtifactMissing {
            path: path.to_path_buf(),
        },
        _ => RegistryError::ArtifactMalformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    serde_json::from_slice(&bytes).map_err(|e| RegistryError::ArtifactMalformed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Load and check a task's scaler against its feature schema
pub fn load_scaler(dir: &Path, task: Task) -> Result<StandardScaler, RegistryError> {
    let path = scaler_path(dir, task);
    let scaler: StandardScaler = read_json(&path)?;

    scaler
        .validate()
        .map_err(|reason| RegistryError::ArtifactMalformed {
            path: path.clone(),
            reason,
        })?;

    if scaler.n_features() != task.feature_count() {
        return Err(RegistryError::SchemaMismatch {
            task,
            reason: format!(
                "scaler fitted on {} features, schema has {}",
                scaler.n_features(),
                task.feature_count()
            ),
        });
    }

    if let Some(names) = &scaler.feature_names {
        if names.iter().map(String::as_str).ne(task.feature_names().iter().copied()) {
            return Err(RegistryError::SchemaMismatch {
                task,
                reason: format!("scaler feature order {:?} differs from schema", names),
            });
        }
    }

    Ok(scaler)
}

/// Load and check a task's regressor
pub fn load_model(dir: &Path, task: Task) -> Result<Box<dyn Regressor>, RegistryError> {
    let path = model_path(dir, task);
    let artifact: ModelArtifact = read_json(&path)?;

    artifact
        .into_regressor(task.feature_count())
        .map_err(|reason| RegistryError::ArtifactMalformed { path, reason })
}
