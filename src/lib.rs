// Library interface for telemex
// This allows the CLI binary and integration tests to access internal modules

pub mod config;
pub mod errors;
pub mod export;
pub mod loader;
pub mod pipeline;
pub mod record;
pub mod timecode;

// Re-export commonly used types
pub use config::{RunConfig, RunSummary, run};
pub use errors::TelemexError;
pub use export::{KmlOptions, export_csv, export_kml};
pub use pipeline::{downsample, filter_by_range, load_and_filter};
pub use record::Record;
pub use timecode::{FRAME_RATE, Timecode};
