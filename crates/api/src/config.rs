//! Gateway configuration
//!
//! Layered from built-in defaults, an optional config file and `COOLING_*`
//! environment variables, in that order. Nested keys use `__`, e.g.
//! `COOLING_RATE_LIMIT__BURST_SIZE=50`.

use crate::rate_limit::RateLimitConfig;
use config::{Config, ConfigError, Environment, File};
use prediction_service::{ServiceConfig, TimeOfDayPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Config file consulted when `COOLING_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "cooling-gateway";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Gateway configuration; absent keys take their default
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Socket address to listen on
    pub bind_addr: String,
    /// Directory holding the `<task>.scaler.json` / `<task>.model.json` pairs
    pub artifact_dir: PathBuf,
    /// Maximum tracing level
    pub log_level: String,
    pub log_format: LogFormat,
    /// Allowed CORS origins; empty allows any origin
    pub cors_allowed_origins: Vec<String>,
    pub rate_limit: RateLimitConfig,
    /// Expose Prometheus metrics on `/metrics`
    pub metrics_enabled: bool,
    /// Reject `time_of_day` values other than "Peak" and "Off-Peak"
    pub strict_time_of_day: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            artifact_dir: PathBuf::from("models"),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            cors_allowed_origins: Vec::new(),
            rate_limit: RateLimitConfig::default(),
            metrics_enabled: true,
            strict_time_of_day: false,
        }
    }
}

impl GatewayConfig {
    /// Load from the file named by `COOLING_CONFIG` (or the default file) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("COOLING_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Load from a specific file (extension optional; missing file is not an error)
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&GatewayConfig::default())?)
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("COOLING")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins"),
            )
            .build()?
            .try_deserialize()
    }

    /// Settings for the prediction service
    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            time_of_day_policy: if self.strict_time_of_day {
                TimeOfDayPolicy::Strict
            } else {
                TimeOfDayPolicy::Permissive
            },
        }
    }
}
