//! Observability infrastructure: tracing and metrics.
//!
//! Binaries call [`init`] once at startup. The library itself only emits
//! `tracing` events and `metrics` facade updates; with no subscriber or
//! recorder installed they are no-ops.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod metrics;

/// Initialize the global tracing subscriber and Prometheus recorder.
///
/// `RUST_LOG` takes precedence; otherwise `default_level` (e.g. `"info"`)
/// applies to every target. The returned handle renders the recorded
/// metrics in the Prometheus text format.
///
/// # Errors
///
/// Fails if `default_level` is not a valid filter directive or a global
/// subscriber or recorder is already installed.
pub fn init(
    default_level: &str,
) -> Result<PrometheusHandle, Box<dyn std::error::Error + Send + Sync>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level)?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_level(true))
        .try_init()?;

    let handle = PrometheusBuilder::new().install_recorder()?;
    metrics::register_core_metrics();

    tracing::debug!(level = default_level, "Observability initialized");
    Ok(handle)
}
