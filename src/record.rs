// Telemetry record model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{TelemexError, timecode::Timecode};

/// Field carrying the `HH:MM:SS:FF` timecode on every record.
pub const TIMECODE_FIELD: &str = "tc";
/// Geometry fields, as named by the logger's wire format.
pub const LATITUDE_FIELD: &str = "latitudeValue";
pub const LONGITUDE_FIELD: &str = "longitudeValue";
pub const ALTITUDE_FIELD: &str = "altitudeValue";

/// One telemetry sample: a schemaless field-name-to-value mapping.
///
/// Key order is the order the fields appeared in the source JSON; CSV column
/// inference relies on that.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, Value>,
}

impl Record {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field names in the record's natural (source) key order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Decodes the record's timecode field. A record without a parsable `tc`
    /// is an error, never treated as epoch zero.
    pub fn timecode(&self) -> Result<Timecode, TelemexError> {
        let text = self
            .fields
            .get(TIMECODE_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| TelemexError::MissingTimecodeField {
                field: TIMECODE_FIELD.to_string(),
            })?;
        Timecode::parse(text)
    }

    /// (longitude, latitude, altitude) for geometry output. Missing or
    /// non-numeric components default to 0.0; only the geospatial exporter
    /// uses this, the tabular exporter leaves missing cells blank instead.
    pub fn coordinate(&self) -> (f64, f64, f64) {
        let numeric = |field: &str| {
            self.fields
                .get(field)
                .and_then(Value::as_f64)
                .unwrap_or(0.0)
        };
        (
            numeric(LONGITUDE_FIELD),
            numeric(LATITUDE_FIELD),
            numeric(ALTITUDE_FIELD),
        )
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

/// Renders a JSON scalar the way it should appear in a CSV cell or KML value:
/// strings without JSON quoting, null as the empty string.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Test helper shared across module tests.
#[cfg(test)]
pub(crate) fn record_from_json(value: Value) -> Record {
    match value {
        Value::Object(map) => Record::from(map),
        _ => panic!("test records must be JSON objects"),
    }
}
