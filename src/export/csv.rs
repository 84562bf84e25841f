// Tabular (CSV) exporter

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::{info, warn};

use crate::{
    TelemexError,
    record::{Record, render_value},
};

/// Writes records as a CSV table: one header row, then one row per record.
/// Returns the number of data rows written.
///
/// When `columns` is not given the column set is inferred from the first
/// record, in that record's natural key order. With heterogeneous record
/// shapes this silently drops fields the first record does not have;
/// passing an explicit column list is the supported way around that.
/// Absent fields render as empty cells.
///
/// The destination is created or overwritten. A failure mid-write leaves a
/// truncated file behind; runs are short and offline, so callers re-run
/// rather than recover.
pub fn export_csv(
    records: &[Record],
    destination: &Path,
    columns: Option<&[String]>,
) -> Result<usize, TelemexError> {
    let columns: Vec<String> = match columns {
        Some(explicit) => explicit.to_vec(),
        None => {
            let first = records.first().ok_or(TelemexError::EmptyInput)?;
            first.field_names().map(str::to_string).collect()
        }
    };

    let file = File::create(destination).map_err(|e| TelemexError::WriteFailure { source: e })?;
    let mut writer = csv::Writer::from_writer(BufWriter::new(file));

    writer
        .write_record(&columns)
        .map_err(|e| TelemexError::CsvWriteFailure { source: e })?;

    let mut dropped_fields = 0usize;
    for record in records {
        let row: Vec<String> = columns
            .iter()
            .map(|column| record.get(column).map(render_value).unwrap_or_default())
            .collect();
        dropped_fields += record
            .field_names()
            .filter(|name| !columns.iter().any(|c| c == name))
            .count();
        writer
            .write_record(&row)
            .map_err(|e| TelemexError::CsvWriteFailure { source: e })?;
    }
    writer
        .flush()
        .map_err(|e| TelemexError::WriteFailure { source: e })?;

    if dropped_fields > 0 {
        warn!(
            "{} field values fell outside the selected columns and were not exported",
            dropped_fields
        );
    }
    info!("Wrote {} rows to {:?}", records.len(), destination);
    Ok(records.len())
}
