use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::domain::ProfileTable;
use crate::error::Result;
use crate::metrics::ExportMetrics;

/// Write the table as UTF-8 CSV: header row, then one record per profile
pub fn write_csv<W: Write>(table: &ProfileTable, writer: W) -> Result<()> {
    let raw = table.to_raw_table();
    let mut csv_writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    csv_writer.write_record(&raw.headers)?;
    for record in &raw.records {
        csv_writer.write_record(record)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn to_csv_bytes(table: &ProfileTable) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_csv(table, &mut buf)?;
    ExportMetrics::record_export(table.len(), buf.len());
    Ok(buf)
}

pub fn export_to_path(table: &ProfileTable, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(table)?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), rows = table.len(), bytes = bytes.len(), "Exported filtered table");
    Ok(())
}
