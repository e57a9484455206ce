//! Registry of task bindings

use crate::artifact::{load_model, load_scaler};
use crate::predictor::Regressor;
use crate::scaler::StandardScaler;
use crate::task::Task;
use crate::RegistryError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Immutable (task, scaler, regressor) triple
pub struct ModelBinding {
    task: Task,
    scaler: StandardScaler,
    regressor: Box<dyn Regressor>,
}

impl ModelBinding {
    /// Bind a scaler and regressor to a task, checking both match its schema width
    pub fn new(
        task: Task,
        scaler: StandardScaler,
        regressor: Box<dyn Regressor>,
    ) -> Result<Self, RegistryError> {
        let expected = task.feature_count();
        if scaler.n_features() != expected || regressor.n_features() != expected {
            return Err(RegistryError::SchemaMismatch {
                task,
                reason: format!(
                    "scaler has {} features, {} model has {}, schema has {}",
                    scaler.n_features(),
                    regressor.kind(),
                    regressor.n_features(),
                    expected
                ),
            });
        }

        Ok(Self {
            task,
            scaler,
            regressor,
        })
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn regressor(&self) -> &dyn Regressor {
        self.regressor.as_ref()
    }
}

impl fmt::Debug for ModelBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBinding")
            .field("task", &self.task)
            .field("scaler", &self.scaler)
            .field("model_kind", &self.regressor.kind())
            .finish()
    }
}

/// Description of one binding for health output
#[derive(Debug, Clone, Serialize)]
pub struct BindingSummary {
    pub task: Task,
    pub model_kind: &'static str,
    pub n_features: usize,
}

/// Process-wide set of bindings, one per task
#[derive(Debug)]
pub struct ModelRegistry {
    bindings: BTreeMap<Task, ModelBinding>,
}

impl ModelRegistry {
    /// Build a registry from exactly one binding per task
    pub fn from_bindings(bindings: Vec<ModelBinding>) -> Result<Self, RegistryError> {
        let mut map = BTreeMap::new();
        for binding in bindings {
            let task = binding.task();
            if map.insert(task, binding).is_some() {
                return Err(RegistryError::DuplicateBinding(task));
            }
        }
        if let Some(task) = Task::ALL.iter().find(|t| !map.contains_key(*t)) {
            return Err(RegistryError::MissingBinding(*task));
        }

        Ok(Self { bindings: map })
    }

    /// Load every task's artifact pair from `dir`.
    ///
    /// Any missing or malformed artifact fails the whole load.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let dir = dir.as_ref();
        info!("Loading model artifacts from {}", dir.display());

        let mut bindings = Vec::with_capacity(Task::ALL.len());
        for task in Task::ALL {
            let scaler = load_scaler(dir, task)?;
            let regressor = load_model(dir, task)?;
            info!(
                "Loaded {} binding: {} model, {} features",
                task,
                regressor.kind(),
                regressor.n_features()
            );
            bindings.push(ModelBinding::new(task, scaler, regressor)?);
        }

        Self::from_bindings(bindings)
    }

    /// Look up a task's binding
    pub fn binding(&self, task: Task) -> Result<&ModelBinding, RegistryError> {
        self.bindings
            .get(&task)
            .ok_or_else(|| RegistryError::UnknownTask(task.to_string()))
    }

    /// Apply a task's scaler to a row in schema order
    pub fn scale(&self, task: Task, row: &[f64]) -> Result<Vec<f64>, RegistryError> {
        self.binding(task)?.scaler().transform(row)
    }

    /// Run a task's regressor on an already-scaled row
    pub fn predict(&self, task: Task, scaled_row: &[f64]) -> Result<f64, RegistryError> {
        let regressor = self.binding(task)?.regressor();
        if scaled_row.len() != regressor.n_features() {
            return Err(RegistryError::DimensionMismatch {
                expected: regressor.n_features(),
                actual: scaled_row.len(),
            });
        }

        let raw = regressor.predict(scaled_row);
        debug!("{} raw prediction: {}", task, raw);
        Ok(raw)
    }

    /// Predict by task name, for callers holding an untyped identifier
    pub fn predict_by_name(&self, task: &str, scaled_row: &[f64]) -> Result<f64, RegistryError> {
        self.predict(task.parse()?, scaled_row)
    }

    /// Summaries of all bindings in task order
    pub fn summaries(&self) -> Vec<BindingSummary> {
        self.bindings
            .values()
            .map(|b| BindingSummary {
                task: b.task(),
                model_kind: b.regressor().kind(),
                n_features: b.regressor().n_features(),
            })
            .collect()
    }
}
