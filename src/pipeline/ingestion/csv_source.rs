use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::domain::RawTable;
use crate::error::{DashboardError, Result};

/// Parse a delimited source into an untyped table.
///
/// The header row is mandatory and every record must have the header's
/// width. Any violation fails the whole read; callers never see a partial
/// table.
pub fn read_raw_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(DashboardError::Load {
            path: "<stream>".to_string(),
            message: "source has no header row".to_string(),
        });
    }

    let mut records = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        records.push(record.iter().map(str::to_string).collect());
    }

    debug!("Parsed {} columns, {} records", headers.len(), records.len());
    Ok(RawTable { headers, records })
}

pub fn read_raw_table_from_bytes(bytes: &[u8]) -> Result<RawTable> {
    read_raw_table(bytes)
}

pub(crate) fn load_error(path: &Path, err: impl std::fmt::Display) -> DashboardError {
    DashboardError::Load {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
