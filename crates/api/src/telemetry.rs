//! Prediction telemetry

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prediction_service::{PredictionError, Task};
use std::time::Instant;

/// Install the global Prometheus recorder
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Run one prediction, recording its outcome and latency
pub fn observe<T>(
    task: Task,
    f: impl FnOnce() -> Result<T, PredictionError>,
) -> Result<T, PredictionError> {
    let start = Instant::now();
    let result = f();

    let outcome = match &result {
        Ok(_) => "ok",
        Err(e) => e.kind().as_str(),
    };
    counter!("predictions_total", "task" => task.as_str(), "outcome" => outcome).increment(1);
    histogram!("prediction_latency_seconds", "task" => task.as_str())
        .record(start.elapsed().as_secs_f64());

    result
}
