//! Prediction pipeline
//!
//! Every task runs the same four stages: bind the record to the task's
//! schema, assemble and scale the row in fit order, run the registry, then
//! post-process. The finiteness gate runs on the bound row, the scaled row
//! and the outputs. Nothing is shared mutably, so one service can serve any
//! number of threads.

use crate::error::PredictionError;
use crate::features::{
    EfficiencyFeatures, FeatureRecord, LifespanFeatures, OptimalRpmFeatures, TimeOfDayPolicy,
};
use crate::output::{
    ensure_finite, EfficiencyPrediction, LifespanPrediction, OptimalRpmPrediction,
    PredictionOutput,
};
use model_registry::{ModelRegistry, Task};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Treatment of unrecognised `time_of_day` labels
    pub time_of_day_policy: TimeOfDayPolicy,
}

/// Stateless prediction front end over a shared registry
#[derive(Debug, Clone)]
pub struct PredictionService {
    registry: Arc<ModelRegistry>,
    config: ServiceConfig,
}

impl PredictionService {
    /// Create a new service
    pub fn new(registry: Arc<ModelRegistry>, config: ServiceConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Route a raw record to the given task
    pub fn predict(
        &self,
        task: Task,
        record: &FeatureRecord,
    ) -> Result<PredictionOutput, PredictionError> {
        match task {
            Task::OptimalRpm => self.predict_optimal_rpm(record).map(PredictionOutput::OptimalRpm),
            Task::Efficiency => self.predict_efficiency(record).map(PredictionOutput::Efficiency),
            Task::Lifespan => self.predict_lifespan(record).map(PredictionOutput::Lifespan),
        }
    }

    /// Predict optimal motor speed and the energy usage at that speed
    pub fn predict_optimal_rpm(
        &self,
        record: &FeatureRecord,
    ) -> Result<OptimalRpmPrediction, PredictionError> {
        let result = OptimalRpmFeatures::from_record(record, self.config.time_of_day_policy)
            .and_then(|features| self.predict_optimal_rpm_features(&features));
        log_outcome(Task::OptimalRpm, result)
    }

    pub fn predict_efficiency(
        &self,
        record: &FeatureRecord,
    ) -> Result<EfficiencyPrediction, PredictionError> {
        let result = EfficiencyFeatures::from_record(record)
            .and_then(|features| self.predict_efficiency_features(&features));
        log_outcome(Task::Efficiency, result)
    }

    pub fn predict_lifespan(
        &self,
        record: &FeatureRecord,
    ) -> Result<LifespanPrediction, PredictionError> {
        let result = LifespanFeatures::from_record(record)
            .and_then(|features| self.predict_lifespan_features(&features));
        log_outcome(Task::Lifespan, result)
    }

    /// Typed optimal-rpm prediction.
    ///
    /// Energy at the predicted speed follows the square of the speed ratio:
    /// `energy_regular * (optimal_rpm / motor_speed)^2`.
    pub fn predict_optimal_rpm_features(
        &self,
        features: &OptimalRpmFeatures,
    ) -> Result<OptimalRpmPrediction, PredictionError> {
        // Checked before inference so a rejected request never reaches the model.
        if features.motor_speed == 0.0 {
            return Err(PredictionError::DivisionByZero { field: "motor_speed" });
        }

        let optimal_rpm = self.infer(Task::OptimalRpm, &features.to_row())?;
        let ratio = optimal_rpm / features.motor_speed;
        let prediction = OptimalRpmPrediction {
            optimal_rpm,
            energy_usage_regular_rpm: features.energy_usage_regular_rpm,
            energy_usage_optimal_rpm: features.energy_usage_regular_rpm * ratio.powi(2),
        };

        ensure_finite(&prediction.outputs())?;
        Ok(prediction)
    }

    pub fn predict_efficiency_features(
        &self,
        features: &EfficiencyFeatures,
    ) -> Result<EfficiencyPrediction, PredictionError> {
        let prediction = EfficiencyPrediction {
            efficiency_percentage: self.infer(Task::Efficiency, &features.to_row())?,
        };
        ensure_finite(&prediction.outputs())?;
        Ok(prediction)
    }

    pub fn predict_lifespan_features(
        &self,
        features: &LifespanFeatures,
    ) -> Result<LifespanPrediction, PredictionError> {
        let prediction = LifespanPrediction {
            remaining_lifespan_years: self.infer(Task::Lifespan, &features.to_row())?,
        };
        ensure_finite(&prediction.outputs())?;
        Ok(prediction)
    }

    /// Scale an ordered row and run the task's model.
    ///
    /// Both the raw and the scaled row must be finite before the model sees them.
    fn infer(&self, task: Task, row: &[f64]) -> Result<f64, PredictionError> {
        ensure_finite(&labelled(task, row))?;
        let scaled = self.registry.scale(task, row)?;
        ensure_finite(&labelled(task, &scaled))?;
        debug!("{} scaled row: {:?}", task, scaled);
        Ok(self.registry.predict(task, &scaled)?)
    }
}

/// Pair a row with the task's feature names
fn labelled(task: Task, row: &[f64]) -> Vec<(&'static str, f64)> {
    task.feature_names().iter().copied().zip(row.iter().copied()).collect()
}

fn log_outcome<T>(task: Task, result: Result<T, PredictionError>) -> Result<T, PredictionError> {
    match &result {
        Ok(_) => debug!("{} prediction succeeded", task),
        Err(e) => warn!(
            task = task.as_str(),
            kind = e.kind().as_str(),
            "Prediction failed: {}",
            e
        ),
    }
    result
}
