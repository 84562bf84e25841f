// Record loading from log files and directories

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::{debug, info};
use serde_json::Value;
use serde_jsonlines::JsonLinesReader;

use crate::{TelemexError, record::Record};

const LOG_EXTENSION: &str = ".dlog";
const COMPRESSED_LOG_EXTENSION: &str = ".dlog.gz";

/// Loads records from a log file or from every log file in a directory.
///
/// Directory listings are sorted by file name before loading so repeated runs
/// over the same directory always merge files in the same order. Files are
/// read sequentially; each file's records are appended in file order.
pub fn load_records(source: &Path) -> Result<Vec<Record>, TelemexError> {
    if !source.exists() {
        return Err(TelemexError::SourceNotFound {
            path: source.display().to_string(),
        });
    }
    if source.is_dir() {
        let mut files = find_log_files(source)?;
        files.sort();
        let mut records = Vec::new();
        for file in &files {
            records.extend(load_log_file(file)?);
        }
        info!(
            "Loaded {} records from {} log files in {:?}",
            records.len(),
            files.len(),
            source
        );
        Ok(records)
    } else {
        let records = load_log_file(source)?;
        info!("Loaded {} records from {:?}", records.len(), source);
        Ok(records)
    }
}

/// Every `*.dlog` / `*.dlog.gz` file directly inside `folder`.
fn find_log_files(folder: &Path) -> Result<Vec<PathBuf>, TelemexError> {
    let entries =
        fs::read_dir(folder).map_err(|e| TelemexError::LoaderError { source: e })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| TelemexError::LoaderError { source: e })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(LOG_EXTENSION) || name.ends_with(COMPRESSED_LOG_EXTENSION) {
                files.push(path);
            }
        }
    }
    Ok(files)
}

/// Loads one log file, transparently gunzipping `*.gz`. The payload is either
/// a top-level JSON array of record objects or one object per line.
fn load_log_file(path: &Path) -> Result<Vec<Record>, TelemexError> {
    let file = File::open(path).map_err(|e| TelemexError::LoaderError { source: e })?;
    let mut contents = String::new();
    let is_gzip = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".gz"));
    if is_gzip {
        GzDecoder::new(file)
            .read_to_string(&mut contents)
            .map_err(|e| TelemexError::LoaderError { source: e })?;
    } else {
        let mut file = file;
        file.read_to_string(&mut contents)
            .map_err(|e| TelemexError::LoaderError { source: e })?;
    }

    let values = if contents.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<Value>>(&contents).map_err(|e| {
            TelemexError::MalformedRecord {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?
    } else {
        JsonLinesReader::new(contents.as_bytes())
            .read_all::<Value>()
            .collect::<Result<Vec<Value>, std::io::Error>>()
            .map_err(|e| TelemexError::MalformedRecord {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?
    };

    let mut records = Vec::with_capacity(values.len());
    for value in values {
        match value {
            // empty objects and nulls contribute nothing
            Value::Null => {}
            Value::Object(map) => {
                let record = Record::from(map);
                if !record.is_empty() {
                    records.push(record);
                }
            }
            other => {
                return Err(TelemexError::MalformedRecord {
                    path: path.display().to_string(),
                    reason: format!("expected a JSON object, got {}", other),
                });
            }
        }
    }
    debug!("{:?}: {} records", path, records.len());
    Ok(records)
}
