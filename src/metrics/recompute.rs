//! Recompute phase metrics: tiering, filtering and aggregation of one view

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct RecomputeMetrics;

impl RecomputeMetrics {
    pub fn record_recompute(rows_in: usize, rows_out: usize, companies: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "recompute", "runs")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "recompute", "rows_filtered_out"))
            .increment(rows_in.saturating_sub(rows_out) as u64);
        ::metrics::gauge!(phase_metric!(gauge, "recompute", "companies")).set(companies as f64);
        ::metrics::histogram!(phase_metric!(histogram, "recompute", "duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_skipped_facet() {
        ::metrics::counter!(phase_metric!(counter, "recompute", "facets_skipped")).increment(1);
    }
}

impl PhaseMetrics for RecomputeMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "recompute", "runs"));
        let _ = counter!(phase_metric!(counter, "recompute", "rows_filtered_out"));
        let _ = counter!(phase_metric!(counter, "recompute", "facets_skipped"));
        let _ = gauge!(phase_metric!(gauge, "recompute", "companies"));
        let _ = histogram!(phase_metric!(histogram, "recompute", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "recompute"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "recompute", "runs"),
                metric_type: MetricType::Counter,
                help: "Dashboard views recomputed",
            },
            MetricDoc {
                name: phase_metric!(counter, "recompute", "rows_filtered_out"),
                metric_type: MetricType::Counter,
                help: "Rows dropped by facet filters",
            },
            MetricDoc {
                name: phase_metric!(counter, "recompute", "facets_skipped"),
                metric_type: MetricType::Counter,
                help: "Active facets ignored because their column is absent",
            },
            MetricDoc {
                name: phase_metric!(gauge, "recompute", "companies"),
                metric_type: MetricType::Gauge,
                help: "Company rollups in the last view",
            },
            MetricDoc {
                name: phase_metric!(histogram, "recompute", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent recomputing one view",
            },
        ]
    }
}
