use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use telemex::{RunConfig, TelemexError, Timecode, run};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Telemetry log file or directory of *.dlog / *.dlog.gz files
    source: PathBuf,

    /// Inclusive lower timecode bound (HH:MM:SS:FF)
    #[arg(long = "from")]
    from_tc: Option<String>,

    /// Inclusive upper timecode bound (HH:MM:SS:FF)
    #[arg(long = "to")]
    to_tc: Option<String>,

    /// CSV output path
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Explicit CSV columns (defaults to the first record's fields)
    #[arg(long, value_delimiter = ',')]
    columns: Option<Vec<String>>,

    /// Keep every (N+1)th record in the CSV export
    #[arg(long, default_value_t = 0)]
    csv_downsample: i64,

    /// KML output path
    #[arg(long)]
    kml: Option<PathBuf>,

    /// Keep every (N+1)th record in the KML track
    #[arg(long, default_value_t = 0)]
    kml_downsample: i64,

    /// Keep every (N+1)th track point as an individual placemark
    #[arg(long, default_value_t = 0)]
    placemark_downsample: i64,

    /// Emit only the track line, no individual placemarks
    #[arg(long)]
    no_placemarks: bool,
}

fn parse_bound(text: Option<&String>) -> Result<Option<Timecode>, TelemexError> {
    text.map(|t| Timecode::parse(t)).transpose()
}

fn execute(args: &Args) -> Result<(), TelemexError> {
    let config = RunConfig {
        source: args.source.clone(),
        // parse the bounds up front so a bad timecode fails before any I/O
        from_tc: parse_bound(args.from_tc.as_ref())?,
        to_tc: parse_bound(args.to_tc.as_ref())?,
        csv_path: args.csv.clone(),
        csv_columns: args.columns.clone(),
        csv_downsample: args.csv_downsample,
        kml_path: args.kml.clone(),
        kml_track_downsample: args.kml_downsample,
        kml_placemark_downsample: args.placemark_downsample,
        kml_include_placemarks: !args.no_placemarks,
    };

    let summary = run(&config)?;
    if let (Some(rows), Some(path)) = (summary.csv_rows, &config.csv_path) {
        println!("Exported {} rows to {}", rows, path.display());
    }
    if let (Some(points), Some(path)) = (summary.kml_track_points, &config.kml_path) {
        println!("Exported {} track points to {}", points, path.display());
    }
    if config.csv_path.is_none() && config.kml_path.is_none() {
        println!("Loaded {} records (no export target given)", summary.records_loaded);
    }
    Ok(())
}

fn main() -> ExitCode {
    colog::init();

    let args = Args::parse();
    match execute(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
