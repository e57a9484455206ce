//! Labelled prediction results

use crate::error::PredictionError;
use serde::Serialize;

pub const OPTIMAL_RPM: &str = "Optimal RPM";
pub const ENERGY_USAGE_REGULAR_RPM: &str = "Energy Usage (Regular RPM) (kW)";
pub const ENERGY_USAGE_OPTIMAL_RPM: &str = "Energy Usage (Optimal RPM) (kW)";
pub const EFFICIENCY_PERCENTAGE: &str = "Efficiency Percentage";
pub const REMAINING_LIFESPAN: &str = "Remaining Lifespan (years)";

/// Reject the first labelled value that is NaN or infinite.
///
/// Applied to bound input rows before inference and to every result after it.
pub fn ensure_finite(values: &[(&'static str, f64)]) -> Result<(), PredictionError> {
    match values.iter().find(|(_, value)| !value.is_finite()) {
        Some(&(field, value)) => Err(PredictionError::NumericInstability { field, value }),
        None => Ok(()),
    }
}

/// Optimal motor speed and the energy usage it implies
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OptimalRpmPrediction {
    #[serde(rename = "Optimal RPM")]
    pub optimal_rpm: f64,
    #[serde(rename = "Energy Usage (Regular RPM) (kW)")]
    pub energy_usage_regular_rpm: f64,
    #[serde(rename = "Energy Usage (Optimal RPM) (kW)")]
    pub energy_usage_optimal_rpm: f64,
}

impl OptimalRpmPrediction {
    pub fn outputs(&self) -> Vec<(&'static str, f64)> {
        vec![
            (OPTIMAL_RPM, self.optimal_rpm),
            (ENERGY_USAGE_REGULAR_RPM, self.energy_usage_regular_rpm),
            (ENERGY_USAGE_OPTIMAL_RPM, self.energy_usage_optimal_rpm),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyPrediction {
    #[serde(rename = "Efficiency Percentage")]
    pub efficiency_percentage: f64,
}

impl EfficiencyPrediction {
    pub fn outputs(&self) -> Vec<(&'static str, f64)> {
        vec![(EFFICIENCY_PERCENTAGE, self.efficiency_percentage)]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LifespanPrediction {
    #[serde(rename = "Remaining Lifespan (years)")]
    pub remaining_lifespan_years: f64,
}

impl LifespanPrediction {
    pub fn outputs(&self) -> Vec<(&'static str, f64)> {
        vec![(REMAINING_LIFESPAN, self.remaining_lifespan_years)]
    }
}

/// Result of any task, serialized as its labelled object
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    OptimalRpm(OptimalRpmPrediction),
    Efficiency(EfficiencyPrediction),
    Lifespan(LifespanPrediction),
}

impl PredictionOutput {
    pub fn outputs(&self) -> Vec<(&'static str, f64)> {
        match self {
            PredictionOutput::OptimalRpm(p) => p.outputs(),
            PredictionOutput::Efficiency(p) => p.outputs(),
            PredictionOutput::Lifespan(p) => p.outputs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite(&[("a", 1.0), ("b", -0.0)]).is_ok());

        let err = ensure_finite(&[("a", 1.0), ("b", f64::INFINITY), ("c", f64::NAN)]).unwrap_err();
        match err {
            PredictionError::NumericInstability { field, value } => {
                assert_eq!(field, "b");
                assert!(value.is_infinite());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_serialized_keys() {
        let output = PredictionOutput::OptimalRpm(OptimalRpmPrediction {
            optimal_rpm: 1275.0,
            energy_usage_regular_rpm: 40.0,
            energy_usage_optimal_rpm: 28.9,
        });
        assert_eq!(
            serde_json::to_value(output).unwrap(),
            json!({
                "Optimal RPM": 1275.0,
                "Energy Usage (Regular RPM) (kW)": 40.0,
                "Energy Usage (Optimal RPM) (kW)": 28.9,
            })
        );

        let lifespan = LifespanPrediction {
            remaining_lifespan_years: 7.5,
        };
        assert_eq!(
            serde_json::to_value(lifespan).unwrap(),
            json!({"Remaining Lifespan (years)": 7.5})
        );
    }

    #[test]
    fn test_outputs_labels_match_serde() {
        let results = [
            PredictionOutput::OptimalRpm(OptimalRpmPrediction {
                optimal_rpm: 1275.0,
                energy_usage_regular_rpm: 40.0,
                energy_usage_optimal_rpm: 28.9,
            }),
            PredictionOutput::Efficiency(EfficiencyPrediction {
                efficiency_percentage: 88.0,
            }),
            PredictionOutput::Lifespan(LifespanPrediction {
                remaining_lifespan_years: 7.5,
            }),
        ];
        for result in results {
            let value = serde_json::to_value(result).unwrap();
            let object = value.as_object().unwrap();
            let outputs = result.outputs();
            assert_eq!(object.len(), outputs.len(), "{value}");
            for (label, v) in outputs {
                assert_eq!(object.get(label), Some(&json!(v)), "{label} missing from {value}");
            }
        }
    }
}
