//! Typed feature records
//!
//! Each record binds a raw JSON object to one task's schema and assembles
//! its values into the order the task's scaler and model were fitted on.

use crate::error::PredictionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw feature object as received from the transport
pub type FeatureRecord = Map<String, Value>;

/// Time-of-day tariff band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeOfDay {
    #[serde(rename = "Peak")]
    Peak,
    #[serde(rename = "Off-Peak")]
    OffPeak,
}

/// How unrecognised `time_of_day` strings are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDayPolicy {
    /// Anything other than "Peak" is Off-Peak
    #[default]
    Permissive,
    /// Only "Peak" and "Off-Peak" are accepted
    Strict,
}

impl TimeOfDay {
    /// Numeric encoding used at fit time
    pub fn encode(self) -> f64 {
        match self {
            TimeOfDay::Peak => 1.0,
            TimeOfDay::OffPeak => 0.0,
        }
    }

    /// Parse a label. Matching is case-sensitive.
    pub fn parse(label: &str, policy: TimeOfDayPolicy) -> Option<Self> {
        match (label, policy) {
            ("Peak", _) => Some(TimeOfDay::Peak),
            ("Off-Peak", _) => Some(TimeOfDay::OffPeak),
            (_, TimeOfDayPolicy::Permissive) => Some(TimeOfDay::OffPeak),
            (_, TimeOfDayPolicy::Strict) => None,
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Bind a numeric field. Numeric strings are accepted.
fn number(record: &FeatureRecord, field: &'static str) -> Result<f64, PredictionError> {
    match record.get(field) {
        None => Err(PredictionError::missing(field)),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| PredictionError::invalid(field, "number out of range")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| PredictionError::invalid(field, format!("'{}' is not a valid number", s))),
        Some(other) => Err(PredictionError::invalid(
            field,
            format!("expected number, got {}", json_type(other)),
        )),
    }
}

fn time_of_day(
    record: &FeatureRecord,
    policy: TimeOfDayPolicy,
) -> Result<TimeOfDay, PredictionError> {
    const FIELD: &str = "time_of_day";
    match record.get(FIELD) {
        None => Err(PredictionError::missing(FIELD)),
        Some(Value::String(s)) => TimeOfDay::parse(s, policy).ok_or_else(|| {
            PredictionError::invalid(FIELD, format!("'{}' is not one of 'Peak', 'Off-Peak'", s))
        }),
        Some(other) => Err(PredictionError::invalid(
            FIELD,
            format!("expected string, got {}", json_type(other)),
        )),
    }
}

/// Inputs for the optimal-rpm task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimalRpmFeatures {
    pub flow_rate: f64,
    pub inlet_temperature: f64,
    pub outlet_temperature: f64,
    pub delta_temperature: f64,
    pub pressure: f64,
    pub delta_pressure: f64,
    pub power_consumption: f64,
    pub vibration: f64,
    pub ambient_temperature: f64,
    pub time_of_day: TimeOfDay,
    pub cooling_load: f64,
    pub motor_speed: f64,
    pub energy_usage_regular_rpm: f64,
}

impl OptimalRpmFeatures {
    pub fn from_record(
        record: &FeatureRecord,
        policy: TimeOfDayPolicy,
    ) -> Result<Self, PredictionError> {
        Ok(Self {
            flow_rate: number(record, "flow_rate")?,
            inlet_temperature: number(record, "inlet_temperature")?,
            outlet_temperature: number(record, "outlet_temperature")?,
            delta_temperature: number(record, "delta_temperature")?,
            pressure: number(record, "pressure")?,
            delta_pressure: number(record, "delta_pressure")?,
            power_consumption: number(record, "power_consumption")?,
            vibration: number(record, "vibration")?,
            ambient_temperature: number(record, "ambient_temperature")?,
            time_of_day: time_of_day(record, policy)?,
            cooling_load: number(record, "cooling_load")?,
            motor_speed: number(record, "motor_speed")?,
            energy_usage_regular_rpm: number(record, "energy_usage_regular_rpm")?,
        })
    }

    /// Row in `Task::OptimalRpm` feature order
    pub fn to_row(&self) -> Vec<f64> {
        vec![
            self.flow_rate,
            self.inlet_temperature,
            self.outlet_temperature,
            self.delta_temperature,
            self.pressure,
            self.delta_pressure,
            self.power_consumption,
            self.vibration,
            self.ambient_temperature,
            self.time_of_day.encode(),
            self.cooling_load,
            self.motor_speed,
            self.energy_usage_regular_rpm,
        ]
    }
}

/// Inputs for the efficiency task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyFeatures {
    pub flow_rate: f64,
    pub inlet_temperature: f64,
    pub outlet_temperature: f64,
    pub delta_temperature: f64,
    pub pressure: f64,
    pub delta_pressure: f64,
    pub power_consumption: f64,
    pub vibration: f64,
    pub ambient_temperature: f64,
    pub cooling_load: f64,
    pub motor_speed: f64,
    pub energy_usage_regular_rpm: f64,
}

impl EfficiencyFeatures {
    pub fn from_record(record: &FeatureRecord) -> Result<Self, PredictionError> {
        Ok(Self {
            flow_rate: number(record, "flow_rate")?,
            inlet_temperature: number(record, "inlet_temperature")?,
            outlet_temperature: number(record, "outlet_temperature")?,
            delta_temperature: number(record, "delta_temperature")?,
            pressure: number(record, "pressure")?,
            delta_pressure: number(record, "delta_pressure")?,
            power_consumption: number(record, "power_consumption")?,
            vibration: number(record, "vibration")?,
            ambient_temperature: number(record, "ambient_temperature")?,
            cooling_load: number(record, "cooling_load")?,
            motor_speed: number(record, "motor_speed")?,
            energy_usage_regular_rpm: number(record, "energy_usage_regular_rpm")?,
        })
    }

    /// Row in `Task::Efficiency` feature order
    pub fn to_row(&self) -> Vec<f64> {
        vec![
            self.flow_rate,
            self.inlet_temperature,
            self.outlet_temperature,
            self.delta_temperature,
            self.pressure,
            self.delta_pressure,
            self.power_consumption,
            self.vibration,
            self.ambient_temperature,
            self.cooling_load,
            self.motor_speed,
            self.energy_usage_regular_rpm,
        ]
    }
}

/// Inputs for the remaining-lifespan task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifespanFeatures {
    pub delta_temperature: f64,
    pub pressure: f64,
    pub delta_pressure: f64,
    pub power_consumption: f64,
    pub cooling_load: f64,
    pub motor_speed: f64,
    pub vibration: f64,
    pub ambient_temperature: f64,
}

impl LifespanFeatures {
    pub fn from_record(record: &FeatureRecord) -> Result<Self, PredictionError> {
        Ok(Self {
            delta_temperature: number(record, "delta_temperature")?,
            pressure: number(record, "pressure")?,
            delta_pressure: number(record, "delta_pressure")?,
            power_consumption: number(record, "power_consumption")?,
            cooling_load: number(record, "cooling_load")?,
            motor_speed: number(record, "motor_speed")?,
            vibration: number(record, "vibration")?,
            ambient_temperature: number(record, "ambient_temperature")?,
        })
    }

    /// Row in `Task::Lifespan` feature order
    pub fn to_row(&self) -> Vec<f64> {
        vec![
            self.delta_temperature,
            self.pressure,
            self.delta_pressure,
            self.power_consumption,
            self.cooling_load,
            self.motor_speed,
            self.vibration,
            self.ambient_temperature,
        ]
    }
}
