//! Phase-organised metrics for the dashboard engine
//!
//! Each phase (load, recompute, export) owns its metric names in a dedicated
//! submodule. The server renders the recorder's state at `GET /metrics`.

pub mod export;
pub mod load;
pub mod recompute;
pub mod registry;

pub use export::ExportMetrics;
pub use load::LoadMetrics;
pub use recompute::RecomputeMetrics;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register every phase's metrics.
///
/// Idempotent. No HTTP listener is started; the recorder is rendered
/// in-process by [`render`].
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Prometheus handle already stored");
            }
            registry::register_all_metrics();
            info!("Prometheus recorder installed");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Prometheus text exposition of the current metric values
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Trait for phase-specific metrics collections
pub trait PhaseMetrics {
    /// Pre-register every metric of the phase so it shows up before first use
    fn register_metrics();

    fn phase_name() -> &'static str;

    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Metric names follow `tam_{phase}_{name}`, counters end in `_total`
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("tam_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("tam_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("tam_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;

#[cfg(test)]
mod tests {
    #[test]
    fn test_metric_naming_convention() {
        assert_eq!(
            phase_metric!(counter, "load", "rows_loaded"),
            "tam_load_rows_loaded_total"
        );
        assert_eq!(
            phase_metric!(histogram, "recompute", "duration_seconds"),
            "tam_recompute_duration_seconds"
        );
        assert_eq!(
            phase_metric!(gauge, "load", "base_rows"),
            "tam_load_base_rows"
        );
    }
}
