//! Prediction task identifiers and their canonical feature order

use crate::RegistryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Feature order the optimal-rpm scaler and forest were fitted on
const OPTIMAL_RPM_FEATURES: [&str; 13] = [
    "flow_rate",
    "inlet_temperature",
    "outlet_temperature",
    "delta_temperature",
    "pressure",
    "delta_pressure",
    "power_consumption",
    "vibration",
    "ambient_temperature",
    "time_of_day",
    "cooling_load",
    "motor_speed",
    "energy_usage_regular_rpm",
];

/// Feature order the efficiency scaler and network were fitted on
const EFFICIENCY_FEATURES: [&str; 12] = [
    "flow_rate",
    "inlet_temperature",
    "outlet_temperature",
    "delta_temperature",
    "pressure",
    "delta_pressure",
    "power_consumption",
    "vibration",
    "ambient_temperature",
    "cooling_load",
    "motor_speed",
    "energy_usage_regular_rpm",
];

/// Feature order the lifespan scaler and network were fitted on
const LIFESPAN_FEATURES: [&str; 8] = [
    "delta_temperature",
    "pressure",
    "delta_pressure",
    "power_consumption",
    "cooling_load",
    "motor_speed",
    "vibration",
    "ambient_temperature",
];

/// One of the three independent prediction tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    /// Optimal motor speed (tree ensemble)
    OptimalRpm,
    /// Efficiency percentage (neural network)
    Efficiency,
    /// Remaining lifespan in years (neural network)
    Lifespan,
}

impl Task {
    /// Every bound task, in registry order
    pub const ALL: [Task; 3] = [Task::OptimalRpm, Task::Efficiency, Task::Lifespan];

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Task::OptimalRpm => "optimal_rpm",
            Task::Efficiency => "efficiency",
            Task::Lifespan => "lifespan",
        }
    }

    /// Ordered feature names the task's scaler and model expect.
    ///
    /// The order is part of the artifact contract: rows must be assembled
    /// in exactly this order before scaling.
    pub fn feature_names(&self) -> &'static [&'static str] {
        match self {
            Task::OptimalRpm => &OPTIMAL_RPM_FEATURES,
            Task::Efficiency => &EFFICIENCY_FEATURES,
            Task::Lifespan => &LIFESPAN_FEATURES,
        }
    }

    /// Number of input features
    pub fn feature_count(&self) -> usize {
        self.feature_names().len()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Task {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "optimal_rpm" | "optimal-rpm" => Ok(Task::OptimalRpm),
            "efficiency" => Ok(Task::Efficiency),
            "lifespan" => Ok(Task::Lifespan),
            other => Err(RegistryError::UnknownTask(other.to_string())),
        }
    }
}
