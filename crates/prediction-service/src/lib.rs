//! Prediction Service
//!
//! Binds raw feature records to each task's schema, scales them, routes them
//! to the registry and turns raw model output into finite, labelled results.

mod error;
mod features;
mod output;
mod service;

pub use error::{ErrorKind, PredictionError};
pub use features::{
    EfficiencyFeatures, FeatureRecord, LifespanFeatures, OptimalRpmFeatures, TimeOfDay,
    TimeOfDayPolicy,
};
pub use output::{
    ensure_finite, EfficiencyPrediction, LifespanPrediction, OptimalRpmPrediction,
    PredictionOutput,
};
pub use service::{PredictionService, ServiceConfig};

pub use model_registry::Task;
