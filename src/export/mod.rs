pub mod csv;
pub mod kml;

pub use csv::export_csv;
pub use kml::{KmlOptions, export_kml};
