// Geospatial (KML) exporter

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use log::info;

use crate::{
    TelemexError, pipeline,
    record::{
        ALTITUDE_FIELD, LATITUDE_FIELD, LONGITUDE_FIELD, Record, TIMECODE_FIELD, render_value,
    },
};

const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";
const POINT_STYLE_ID: &str = "pointstyle";
const POINT_ICON_HREF: &str = "http://maps.google.com/mapfiles/kml/shapes/placemark_circle.png";

#[derive(Clone, Copy, Debug)]
pub struct KmlOptions {
    /// Downsample factor applied to the full record sequence to pick the
    /// track points.
    pub track_downsample: i64,
    /// Second downsample factor, applied over positions in the already
    /// track-downsampled sequence, picking which track points also get an
    /// individual placemark.
    pub placemark_downsample: i64,
    pub include_placemarks: bool,
}

impl Default for KmlOptions {
    fn default() -> Self {
        Self {
            track_downsample: 0,
            placemark_downsample: 0,
            include_placemarks: true,
        }
    }
}

/// Writes a KML document with one placemark per selected point and exactly one
/// LineString connecting every track point in order. Returns the track point
/// count.
///
/// The document is staged to a `.tmp` sibling and renamed into place, so the
/// destination is either the previous file or a complete export, never a
/// partial one.
pub fn export_kml(
    records: Vec<Record>,
    destination: &Path,
    opts: KmlOptions,
) -> Result<usize, TelemexError> {
    if records.is_empty() {
        return Err(TelemexError::EmptyInput);
    }
    let track_points = pipeline::downsample(records, opts.track_downsample)?;
    let placemark_step = usize::try_from(opts.placemark_downsample)
        .map_err(|_| TelemexError::InvalidDownsampleFactor {
            factor: opts.placemark_downsample,
        })?
        + 1;

    let mut doc = String::new();
    doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(doc, "<kml xmlns=\"{}\">", KML_NAMESPACE);
    doc.push_str("  <Document id=\"telemetry\">\n");
    doc.push_str("    <name>Telemetry Data</name>\n");
    let _ = writeln!(doc, "    <Style id=\"{}\">", POINT_STYLE_ID);
    doc.push_str("      <IconStyle>\n");
    doc.push_str("        <scale>0.5</scale>\n");
    let _ = writeln!(doc, "        <Icon><href>{}</href></Icon>", POINT_ICON_HREF);
    doc.push_str("      </IconStyle>\n");
    doc.push_str("    </Style>\n");

    let mut coordinates = Vec::with_capacity(track_points.len());
    for (position, record) in track_points.iter().enumerate() {
        let (lon, lat, alt) = record.coordinate();
        if opts.include_placemarks && position % placemark_step == 0 {
            write_point_placemark(&mut doc, record, (lon, lat, alt))?;
        }
        coordinates.push(format!("{},{},{}", lon, lat, alt));
    }

    // the connecting track, always exactly one
    doc.push_str("    <Placemark>\n");
    doc.push_str("      <LineString>\n");
    let _ = writeln!(doc, "        <coordinates>{}</coordinates>", coordinates.join(" "));
    doc.push_str("      </LineString>\n");
    doc.push_str("    </Placemark>\n");
    doc.push_str("  </Document>\n");
    doc.push_str("</kml>\n");

    write_atomically(destination, doc.as_bytes())?;
    info!(
        "Wrote {} track points to {:?}",
        coordinates.len(),
        destination
    );
    Ok(coordinates.len())
}

fn write_point_placemark(
    doc: &mut String,
    record: &Record,
    (lon, lat, alt): (f64, f64, f64),
) -> Result<(), TelemexError> {
    let label = record.timecode()?.to_string();
    let _ = writeln!(doc, "    <Placemark id=\"pmid-{}\">", escape_xml(&label));
    let _ = writeln!(doc, "      <name>{}</name>", escape_xml(&label));
    let _ = writeln!(doc, "      <styleUrl>#{}</styleUrl>", POINT_STYLE_ID);
    doc.push_str("      <ExtendedData>\n");
    for (name, value) in record.iter() {
        if matches!(
            name,
            TIMECODE_FIELD | LATITUDE_FIELD | LONGITUDE_FIELD | ALTITUDE_FIELD
        ) {
            continue;
        }
        let _ = writeln!(
            doc,
            "        <Data name=\"{}\"><value>{}</value></Data>",
            escape_xml(name),
            escape_xml(&render_value(value))
        );
    }
    doc.push_str("      </ExtendedData>\n");
    let _ = writeln!(doc, "      <Point><coordinates>{},{},{}</coordinates></Point>", lon, lat, alt);
    doc.push_str("    </Placemark>\n");
    Ok(())
}

/// Stage to a temporary sibling, then rename over the destination.
fn write_atomically(destination: &Path, contents: &[u8]) -> Result<(), TelemexError> {
    let temp_path = destination.with_extension("tmp");
    {
        let mut temp_file =
            File::create(&temp_path).map_err(|e| TelemexError::WriteFailure { source: e })?;
        temp_file
            .write_all(contents)
            .map_err(|e| TelemexError::WriteFailure { source: e })?;
        temp_file
            .sync_all()
            .map_err(|e| TelemexError::WriteFailure { source: e })?;
    }
    fs::rename(&temp_path, destination).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        TelemexError::WriteFailure { source: e }
    })
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record_from_json;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_records(count: usize) -> Vec<Record> {
        (0..count)
            .map(|i| {
                record_from_json(json!({
                    "tc": format!("00:00:{:02}:00", i),
                    "latitudeValue": 44.0 + i as f64,
                    "longitudeValue": -63.0 - i as f64,
                    "altitudeValue": 100.0,
                    "speed": i * 10,
                }))
            })
            .collect()
    }

    #[test]
    fn test_empty_input_fails_without_writing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.kml");
        let result = export_kml(Vec::new(), &out, KmlOptions::default());
        assert!(matches!(result, Err(TelemexError::EmptyInput)));
        assert!(!out.exists());
    }

    #[test]
    fn test_document_has_one_track_and_style() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.kml");
        let count = export_kml(sample_records(3), &out, KmlOptions::default()).unwrap();
        assert_eq!(count, 3);

        let contents = fs::read_to_string(&out).unwrap();
        assert_eq!(contents.matches("<LineString>").count(), 1);
        assert_eq!(contents.matches("<Style id=\"pointstyle\">").count(), 1);
        assert_eq!(contents.matches("<styleUrl>#pointstyle</styleUrl>").count(), 3);
        assert!(contents.contains("<coordinates>-63,44,100 -64,45,100 -65,46,100</coordinates>"));
        // no temp file left behind
        assert!(!dir.path().join("out.tmp").exists());
    }

    #[test]
    fn test_placemark_names_and_metadata() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.kml");
        export_kml(sample_records(1), &out, KmlOptions::default()).unwrap();

        let contents = fs::read_to_string(&out).unwrap();
        assert!(contents.contains("<name>00:00:00:00</name>"));
        assert!(contents.contains("<Data name=\"speed\"><value>0</value></Data>"));
        // geometry and timecode fields stay out of the metadata block
        assert!(!contents.contains("<Data name=\"latitudeValue\">"));
        assert!(!contents.contains("<Data name=\"tc\">"));
    }

    #[test]
    fn test_track_downsample_thins_the_line() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.kml");
        let opts = KmlOptions {
            track_downsample: 1,
            ..Default::default()
        };
        let count = export_kml(sample_records(5), &out, opts).unwrap();
        // positions 0, 2, 4
        assert_eq!(count, 3);
    }

    #[test]
    fn test_placemark_downsample_runs_over_track_positions() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.kml");
        let opts = KmlOptions {
            track_downsample: 1,
            placemark_downsample: 1,
            include_placemarks: true,
        };
        export_kml(sample_records(6), &out, opts).unwrap();

        // track keeps records 0, 2, 4; placemarks keep track positions 0 and 2,
        // so records 0 and 4
        let contents = fs::read_to_string(&out).unwrap();
        assert!(contents.contains("<name>00:00:00:00</name>"));
        assert!(!contents.contains("<name>00:00:02:00</name>"));
        assert!(contents.contains("<name>00:00:04:00</name>"));
    }

    #[test]
    fn test_no_placemarks_still_emits_track() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.kml");
        let opts = KmlOptions {
            include_placemarks: false,
            ..Default::default()
        };
        export_kml(sample_records(3), &out, opts).unwrap();

        let contents = fs::read_to_string(&out).unwrap();
        assert_eq!(contents.matches("<LineString>").count(), 1);
        assert!(!contents.contains("<ExtendedData>"));
    }

    #[test]
    fn test_metadata_values_are_escaped() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.kml");
        let records = vec![record_from_json(json!({
            "tc": "00:00:00:00",
            "note": "<b>fast & loose</b>",
        }))];
        export_kml(records, &out, KmlOptions::default()).unwrap();

        let contents = fs::read_to_string(&out).unwrap();
        assert!(contents.contains("&lt;b&gt;fast &amp; loose&lt;/b&gt;"));
        assert!(!contents.contains("<b>fast"));
    }

    #[test]
    fn test_missing_geometry_defaults_to_zero() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.kml");
        let records = vec![record_from_json(json!({"tc": "00:00:00:00"}))];
        export_kml(records, &out, KmlOptions::default()).unwrap();

        let contents = fs::read_to_string(&out).unwrap();
        assert!(contents.contains("<coordinates>0,0,0</coordinates>"));
    }
}
