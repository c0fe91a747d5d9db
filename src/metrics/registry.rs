//! Registration of every phase's metrics, with name-conflict detection

use crate::metrics::{MetricDoc, PhaseMetrics};
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub fn register_all_metrics() {
    let mut all_metrics = HashMap::new();

    register_phase_metrics::<super::load::LoadMetrics>(&mut all_metrics);
    register_phase_metrics::<super::recompute::RecomputeMetrics>(&mut all_metrics);
    register_phase_metrics::<super::export::ExportMetrics>(&mut all_metrics);

    info!("Registered {} metrics across all phases", all_metrics.len());
}

fn register_phase_metrics<T: PhaseMetrics>(all_metrics: &mut HashMap<&'static str, MetricDoc>) {
    T::register_metrics();
    let phase_name = T::phase_name();

    for doc in T::metrics_documentation() {
        if phase_of(doc.name) != phase_name {
            warn!(metric = doc.name, phase = phase_name, "Metric name does not carry its phase prefix");
        }
        if all_metrics.contains_key(doc.name) {
            warn!(metric = doc.name, phase = phase_name, "Metric name conflict");
        } else {
            debug!(metric = doc.name, kind = ?doc.metric_type, help = doc.help, "Registered metric");
            all_metrics.insert(doc.name, doc);
        }
    }
}

/// Phase segment of a metric name ("tam_load_runs_total" -> "load")
fn phase_of(metric_name: &str) -> &str {
    metric_name
        .strip_prefix("tam_")
        .and_then(|rest| rest.split('_').next())
        .unwrap_or("unknown")
}
