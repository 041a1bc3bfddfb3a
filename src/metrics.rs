// src/metrics.rs
use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and register the relay's series so
/// they are listed on `/metrics` before the first pass.
///
/// Fails if a recorder is already installed in this process.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("prometheus: install recorder")?;
    crate::ingest::ensure_metrics_described();
    crate::notify::ensure_metrics_described();
    ::metrics::describe_counter!("scheduler_passes_total", "Passes run by the scheduler, per job.");
    Ok(handle)
}
