// Range filtering and deterministic downsampling

use std::path::Path;

use log::info;

use crate::{TelemexError, loader, record::Record, timecode::Timecode};

/// Keeps records whose timecode falls within the inclusive `[from, to]` bound.
/// An absent bound is unbounded on that side. Input order is preserved; the
/// filter never re-sorts, so time-ordered output requires time-ordered input.
///
/// Policy: the filter aborts on the first record with a missing or malformed
/// timecode. Nothing is skipped silently.
pub fn filter_by_range(
    records: Vec<Record>,
    from: Option<&Timecode>,
    to: Option<&Timecode>,
) -> Result<Vec<Record>, TelemexError> {
    let from_ms = from.map(Timecode::to_millis);
    let to_ms = to.map(Timecode::to_millis);

    let mut filtered = Vec::with_capacity(records.len());
    for record in records {
        let tc_ms = record.timecode()?.to_millis();
        let after_from = from_ms.is_none_or(|from| from <= tc_ms);
        let before_to = to_ms.is_none_or(|to| tc_ms <= to);
        if after_from && before_to {
            filtered.push(record);
        }
    }
    Ok(filtered)
}

/// Keeps every (factor + 1)th record: positions where
/// `position % (factor + 1) == 0`. Factor 0 keeps everything.
pub fn downsample(records: Vec<Record>, factor: i64) -> Result<Vec<Record>, TelemexError> {
    if factor < 0 {
        return Err(TelemexError::InvalidDownsampleFactor { factor });
    }
    let step = factor as usize + 1;
    Ok(records
        .into_iter()
        .enumerate()
        .filter(|(position, _)| position % step == 0)
        .map(|(_, record)| record)
        .collect())
}

/// Loads a source (file or directory) and applies the range filter. This is
/// the entry point the presentation layer calls before exporting.
pub fn load_and_filter(
    source: &Path,
    from: Option<&Timecode>,
    to: Option<&Timecode>,
) -> Result<Vec<Record>, TelemexError> {
    let records = loader::load_records(source)?;
    let total = records.len();
    let filtered = filter_by_range(records, from, to)?;
    if from.is_some() || to.is_some() {
        info!(
            "Timecode filter kept {} of {} records",
            filtered.len(),
            total
        );
    }
    Ok(filtered)
}
