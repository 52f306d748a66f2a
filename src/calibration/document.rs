use super::group::calibrate_group;
use super::table::CalibrationTable;
use super::CalibrationOptions;
use crate::core::{CalibrationStats, GroupPrefixes, MetricGroup};
use crate::errors::CalibrationError;
use serde_json::Value;

/// Field holding both metric groups
pub const METRICS_FIELD: &str = "metrics";

/// Calibrate both metric groups of a document in place.
///
/// Calibrated entries are merged into their group; existing keys are kept
/// except where a calibrated key collides with one, in which case the
/// calibrated value wins. A group missing from `metrics` is treated as empty
/// and is not created. Everything outside the two groups is left untouched.
pub fn calibrate_document(
    document: &mut Value,
    table: &CalibrationTable,
    prefixes: &GroupPrefixes,
    options: CalibrationOptions,
) -> Result<CalibrationStats, CalibrationError> {
    let metrics = document
        .as_object_mut()
        .ok_or(CalibrationError::NotAnObject)?
        .get_mut(METRICS_FIELD)
        .ok_or(CalibrationError::MissingMetrics)?
        .as_object_mut()
        .ok_or(CalibrationError::InvalidMetrics)?;

    let mut stats = CalibrationStats::default();
    for group in MetricGroup::ALL {
        let Some(slot) = metrics.get_mut(group.field_name()) else {
            log::debug!("No `{group}` group, nothing to calibrate");
            continue;
        };
        let values = slot
            .as_object_mut()
            .ok_or(CalibrationError::InvalidGroup { group })?;

        let calibration = calibrate_group(values, table, prefixes.for_group(group), options)?;
        for (key, value) in calibration.entries {
            if let Some(previous) = values.insert(key.clone(), value) {
                log::debug!("Overwrote existing `{key}` ({previous}) in `{group}`");
            }
        }
        *stats.group_mut(group) = calibration.stats;
    }

    Ok(stats)
}
