//! Standard scaler with parameters frozen at training time

use crate::RegistryError;
use serde::{Deserialize, Serialize};

/// Per-feature affine transform: `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Training mean of each feature
    pub mean: Vec<f64>,
    /// Training standard deviation of each feature
    pub scale: Vec<f64>,
    /// Column names seen at fit time, if the trainer recorded them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    /// Create a scaler from fitted parameters
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            mean,
            scale,
            feature_names: None,
        }
    }

    /// Scaler that leaves rows unchanged
    pub fn identity(n_features: usize) -> Self {
        Self::new(vec![0.0; n_features], vec![1.0; n_features])
    }

    /// Number of features the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Check the fitted parameters are usable.
    ///
    /// Returns a human-readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.mean.len() {
                return Err(format!(
                    "{} feature names for {} features",
                    names.len(),
                    self.mean.len()
                ));
            }
        }
        if let Some(i) = self.mean.iter().position(|m| !m.is_finite()) {
            return Err(format!("mean[{}] is not finite", i));
        }
        if let Some(i) = self.scale.iter().position(|s| !s.is_finite() || *s <= 0.0) {
            return Err(format!("scale[{}] = {} is not a positive finite number", i, self.scale[i]));
        }
        Ok(())
    }

    /// Scale a row ordered as at fit time
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, RegistryError> {
        if row.len() != self.n_features() {
            return Err(RegistryError::DimensionMismatch {
                expected: self.n_features(),
                actual: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}
