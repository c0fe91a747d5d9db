// Data pipeline: ingestion of the delimited source, then processing into the base table

pub mod ingestion;
pub mod processing;

use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument};

use crate::domain::ProfileTable;
use crate::error::Result;
use crate::metrics::LoadMetrics;
use processing::normalize::{ColumnNormalizer, NormalizationReport};

/// The normalized, immutable table every view is derived from
#[derive(Debug, Clone)]
pub struct BaseTable {
    pub table: ProfileTable,
    pub report: NormalizationReport,
    /// SHA-256 of the source bytes, hex encoded
    pub source_sha256: String,
}

/// Parse and normalize source bytes. Fails as a whole; never returns a partial table.
pub fn prepare_base_table_from_bytes(bytes: &[u8]) -> Result<BaseTable> {
    let started = Instant::now();
    let raw = match ingestion::read_raw_table_from_bytes(bytes) {
        Ok(raw) => raw,
        Err(e) => {
            LoadMetrics::record_load_failure();
            return Err(e);
        }
    };
    let normalized = ColumnNormalizer::new().normalize(&raw);

    let coerced: usize = normalized.report.unparseable_cells.values().sum();
    LoadMetrics::record_load_success(
        normalized.table.len(),
        coerced,
        started.elapsed().as_secs_f64(),
    );
    Ok(BaseTable {
        table: normalized.table,
        report: normalized.report,
        source_sha256: crate::cache::content_key(bytes),
    })
}

/// Load → normalize chain for a source file
#[instrument(skip_all, fields(path = %path.display()))]
pub fn prepare_base_table(path: &Path) -> Result<BaseTable> {
    let bytes = std::fs::read(path).map_err(|e| {
        LoadMetrics::record_load_failure();
        ingestion::csv_source::load_error(path, e)
    })?;
    let base = prepare_base_table_from_bytes(&bytes)
        .map_err(|e| ingestion::csv_source::load_error(path, e))?;
    info!(
        rows = base.table.len(),
        columns = base.table.columns.len(),
        "Prepared base table"
    );
    Ok(base)
}
