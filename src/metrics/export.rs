//! Export phase metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct ExportMetrics;

impl ExportMetrics {
    pub fn record_export(rows: usize, bytes: usize) {
        ::metrics::counter!(phase_metric!(counter, "export", "files")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "export", "rows")).increment(rows as u64);
        ::metrics::histogram!(phase_metric!(histogram, "export", "bytes")).record(bytes as f64);
    }
}

impl PhaseMetrics for ExportMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "export", "files"));
        let _ = counter!(phase_metric!(counter, "export", "rows"));
        let _ = histogram!(phase_metric!(histogram, "export", "bytes"));
    }

    fn phase_name() -> &'static str {
        "export"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "export", "files"),
                metric_type: MetricType::Counter,
                help: "CSV exports written",
            },
            MetricDoc {
                name: phase_metric!(counter, "export", "rows"),
                metric_type: MetricType::Counter,
                help: "Profile rows written to CSV exports",
            },
            MetricDoc {
                name: phase_metric!(histogram, "export", "bytes"),
                metric_type: MetricType::Histogram,
                help: "Size of each CSV export in bytes",
            },
        ]
    }
}
