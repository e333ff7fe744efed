//! CSV export
//!
//! Serializes the pipeline's table shapes to CSV. Each writer targets a
//! generic `io::Write` so callers can write to files, buffers, or stdout;
//! the CLI layer owns file handling. Writers refuse empty inputs rather
//! than producing a header-only file.

mod csv_writer;

pub use csv_writer::{write_daily_aggregate, write_flat_table, write_risk_scores, CsvExporter};
