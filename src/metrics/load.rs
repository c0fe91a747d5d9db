//! Load phase metrics: reading and normalizing the source table

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct LoadMetrics;

impl LoadMetrics {
    pub fn record_load_success(rows: usize, unparseable_cells: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "load", "runs")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "load", "rows_loaded")).increment(rows as u64);
        ::metrics::counter!(phase_metric!(counter, "load", "cells_coerced"))
            .increment(unparseable_cells as u64);
        ::metrics::gauge!(phase_metric!(gauge, "load", "base_rows")).set(rows as f64);
        ::metrics::histogram!(phase_metric!(histogram, "load", "duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_load_failure() {
        ::metrics::counter!(phase_metric!(counter, "load", "failures")).increment(1);
    }

    pub fn record_cache_hit() {
        ::metrics::counter!(phase_metric!(counter, "load", "cache_hits")).increment(1);
    }
}

impl PhaseMetrics for LoadMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge, histogram};

        let _ = counter!(phase_metric!(counter, "load", "runs"));
        let _ = counter!(phase_metric!(counter, "load", "rows_loaded"));
        let _ = counter!(phase_metric!(counter, "load", "cells_coerced"));
        let _ = counter!(phase_metric!(counter, "load", "failures"));
        let _ = counter!(phase_metric!(counter, "load", "cache_hits"));
        let _ = gauge!(phase_metric!(gauge, "load", "base_rows"));
        let _ = histogram!(phase_metric!(histogram, "load", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "load"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "load", "runs"),
                metric_type: MetricType::Counter,
                help: "Successful source loads",
            },
            MetricDoc {
                name: phase_metric!(counter, "load", "rows_loaded"),
                metric_type: MetricType::Counter,
                help: "Profile rows read from the source",
            },
            MetricDoc {
                name: phase_metric!(counter, "load", "cells_coerced"),
                metric_type: MetricType::Counter,
                help: "Unparseable cells coerced to missing",
            },
            MetricDoc {
                name: phase_metric!(counter, "load", "failures"),
                metric_type: MetricType::Counter,
                help: "Loads that failed and served no table",
            },
            MetricDoc {
                name: phase_metric!(counter, "load", "cache_hits"),
                metric_type: MetricType::Counter,
                help: "Loads answered from the content-addressed cache",
            },
            MetricDoc {
                name: phase_metric!(gauge, "load", "base_rows"),
                metric_type: MetricType::Gauge,
                help: "Rows in the current base table",
            },
            MetricDoc {
                name: phase_metric!(histogram, "load", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent reading and normalizing the source",
            },
        ]
    }
}
