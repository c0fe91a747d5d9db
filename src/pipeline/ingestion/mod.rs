// Pipeline ingestion: reading the delimited source into an untyped table

pub mod csv_source;

pub use csv_source::{read_raw_table, read_raw_table_from_bytes};
