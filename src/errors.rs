// Error types for telemex

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum TelemexError {
    // Timecode codec errors
    #[snafu(display("Malformed timecode: {text:?}"))]
    MalformedTimecode { text: String },
    #[snafu(display("Record has no {field:?} field required for timecode operations"))]
    MissingTimecodeField { field: String },

    // Pipeline errors
    #[snafu(display("Downsample factor must be >= 0, got {factor}"))]
    InvalidDownsampleFactor { factor: i64 },
    #[snafu(display("No records to export"))]
    EmptyInput,

    // Loader errors
    #[snafu(display("Input path not found: {path}"))]
    SourceNotFound { path: String },
    #[snafu(display("Error reading telemetry source"))]
    LoaderError { source: io::Error },
    #[snafu(display("Malformed telemetry record in {path}: {reason}"))]
    MalformedRecord { path: String, reason: String },

    // Exporter errors
    #[snafu(display("Error writing export file"))]
    WriteFailure { source: io::Error },
    #[snafu(display("Error serializing CSV row"))]
    CsvWriteFailure { source: csv::Error },
}
