// Per-run pipeline configuration

use std::path::PathBuf;

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    TelemexError,
    export::{KmlOptions, export_csv, export_kml},
    pipeline::{downsample, load_and_filter},
    timecode::Timecode,
};

/// Everything one pipeline run needs, fixed up front. Built by the CLI (or any
/// other shell) and consumed by [`run`]; nothing here mutates mid-run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunConfig {
    /// Log file or directory of log files.
    pub source: PathBuf,
    /// Inclusive lower timecode bound.
    pub from_tc: Option<Timecode>,
    /// Inclusive upper timecode bound.
    pub to_tc: Option<Timecode>,

    pub csv_path: Option<PathBuf>,
    /// Explicit CSV column projection; inferred from the first record when
    /// absent.
    pub csv_columns: Option<Vec<String>>,
    pub csv_downsample: i64,

    pub kml_path: Option<PathBuf>,
    pub kml_track_downsample: i64,
    pub kml_placemark_downsample: i64,
    pub kml_include_placemarks: bool,
}

/// Summary of what one run produced, for the shell's reporting.
#[derive(Clone, Copy, Debug, Default)]
pub struct RunSummary {
    pub records_loaded: usize,
    pub csv_rows: Option<usize>,
    pub kml_track_points: Option<usize>,
}

/// Executes one full pipeline run: load, filter, then downsample and export
/// per configured target. Errors surface immediately; nothing is retried.
pub fn run(config: &RunConfig) -> Result<RunSummary, TelemexError> {
    let records = load_and_filter(
        &config.source,
        config.from_tc.as_ref(),
        config.to_tc.as_ref(),
    )?;
    let mut summary = RunSummary {
        records_loaded: records.len(),
        ..Default::default()
    };

    if let Some(csv_path) = &config.csv_path {
        let table_records = downsample(records.clone(), config.csv_downsample)?;
        let rows = export_csv(&table_records, csv_path, config.csv_columns.as_deref())?;
        summary.csv_rows = Some(rows);
    }

    if let Some(kml_path) = &config.kml_path {
        let opts = KmlOptions {
            track_downsample: config.kml_track_downsample,
            placemark_downsample: config.kml_placemark_downsample,
            include_placemarks: config.kml_include_placemarks,
        };
        let points = export_kml(records, kml_path, opts)?;
        summary.kml_track_points = Some(points);
    }

    info!(
        "Run complete: {} records, csv rows: {:?}, kml track points: {:?}",
        summary.records_loaded, summary.csv_rows, summary.kml_track_points
    );
    Ok(summary)
}
