use super::key::derive_calibration_key;
use super::table::CalibrationTable;
use super::CalibrationOptions;
use crate::core::{GroupStats, MetricMap, CALIBRATED_KEY_PREFIX};
use crate::errors::CalibrationError;
use serde_json::{Number, Value};

/// New entries produced for one metric group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupCalibration {
    /// `Cal<name>` entries only; the original metrics are not repeated
    pub entries: MetricMap,
    pub stats: GroupStats,
}

/// Calibrate every metric of a group whose derived key is in the table.
///
/// Returns only the new `Cal<name>` entries; merging them into the group is
/// up to the caller. Metrics without a table match are counted and skipped.
pub fn calibrate_group(
    metrics: &MetricMap,
    table: &CalibrationTable,
    prefix: &str,
    options: CalibrationOptions,
) -> Result<GroupCalibration, CalibrationError> {
    let mut result = GroupCalibration::default();

    for (name, value) in metrics {
        if options.skip_calibrated_keys && is_previous_output(name, metrics) {
            result.stats.skipped += 1;
            continue;
        }

        let key = derive_calibration_key(name, prefix);
        let Some(entry) = table.get(&key) else {
            log::trace!("No calibration entry {key} for {name}");
            result.stats.unmatched += 1;
            continue;
        };

        let slope = entry
            .slope()
            .ok_or_else(|| CalibrationError::MissingSlope { key: key.clone() })?;
        let Value::Number(number) = value else {
            return Err(CalibrationError::NonNumericMetric {
                metric: name.clone(),
                key,
            });
        };
        let calibrated = multiply(number, slope).ok_or_else(|| {
            CalibrationError::NonFiniteResult {
                metric: name.clone(),
                key: key.clone(),
            }
        })?;

        log::debug!("{name} x {slope} ({key}) = {calibrated}");
        result
            .entries
            .insert(calibrated_key(name), Value::Number(calibrated));
        result.stats.calibrated += 1;
    }

    Ok(result)
}

/// Key under which the calibrated value of `name` is stored
pub fn calibrated_key(name: &str) -> String {
    format!("{CALIBRATED_KEY_PREFIX}{name}")
}

// `Cal<X>` is an earlier output only if `<X>` sits beside it in the group
fn is_previous_output(name: &str, metrics: &MetricMap) -> bool {
    name.strip_prefix(CALIBRATED_KEY_PREFIX)
        .is_some_and(|original| !original.is_empty() && metrics.contains_key(original))
}

/// Integer inputs keep an integer product when it fits; everything else is f64
fn multiply(value: &Number, slope: &Number) -> Option<Number> {
    if let (Some(a), Some(b)) = (value.as_i64(), slope.as_i64()) {
        if let Some(product) = a.checked_mul(b) {
            return Some(Number::from(product));
        }
    }
    Number::from_f64(value.as_f64()? * slope.as_f64()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn group(value: Value) -> MetricMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn table(json: Value) -> CalibrationTable {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_std_metric_uses_stripped_key() {
        let metrics = group(json!({"Std_bar": 10}));
        let table = table(json!({"CTA.Global_bar": {"slope": 0.5}}));

        let result =
            calibrate_group(&metrics, &table, "CTA.Global_", CalibrationOptions::default())
                .unwrap();

        assert_eq!(Value::Object(result.entries), json!({"CalStd_bar": 5.0}));
        assert_eq!(result.stats.calibrated, 1);
    }

    #[test]
    fn test_unmatched_metrics_are_omitted() {
        let metrics = group(json!({"Mean_foo": 2.0, "Area": 3.0}));
        let table = table(json!({"CTA.SaliencyWtdMean_foo": {"slope": 1.5}}));

        let result = calibrate_group(
            &metrics,
            &table,
            "CTA.SaliencyWtdMean_",
            CalibrationOptions::default(),
        )
        .unwrap();

        assert_eq!(Value::Object(result.entries), json!({"CalMean_foo": 3.0}));
        assert_eq!(
            result.stats,
            GroupStats {
                calibrated: 1,
                unmatched: 1,
                skipped: 0
            }
        );
    }

    #[test]
    fn test_mean_and_std_share_a_slope() {
        let metrics = group(json!({"Mean_Area": 4.0, "Std_Area": 1.0}));
        let table = table(json!({"P_Area": {"slope": 0.25}}));

        let result = calibrate_group(&metrics, &table, "P_", CalibrationOptions::default())
            .unwrap();

        assert_eq!(
            Value::Object(result.entries),
            json!({"CalMean_Area": 1.0, "CalStd_Area": 0.25})
        );
    }

    #[test]
    fn test_integer_inputs_stay_integer() {
        let metrics = group(json!({"Count": 7}));
        let table = table(json!({"P_Count": {"slope": 3}}));

        let result = calibrate_group(&metrics, &table, "P_", CalibrationOptions::default())
            .unwrap();

        assert_eq!(result.entries.get("CalCount"), Some(&json!(21)));
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        let metrics = group(json!({"Count": i64::MAX}));
        let table = table(json!({"P_Count": {"slope": 2}}));

        let result = calibrate_group(&metrics, &table, "P_", CalibrationOptions::default())
            .unwrap();

        let value = result.entries.get("CalCount").unwrap();
        assert!(value.is_f64());
    }

    #[test]
    fn test_previous_outputs_are_skipped_by_default() {
        let metrics = group(json!({"Std_bar": 10, "CalStd_bar": 5.0}));
        let table = table(json!({
            "P_bar": {"slope": 0.5},
            "P_CalStd_bar": {"slope": 9.0},
            "P_Calbar": {"slope": 9.0}
        }));

        let result = calibrate_group(&metrics, &table, "P_", CalibrationOptions::default())
            .unwrap();

        assert_eq!(Value::Object(result.entries), json!({"CalStd_bar": 5.0}));
        assert_eq!(result.stats.skipped, 1);
    }

    #[test]
    fn test_recalibrate_processes_cal_keys_that_match() {
        let metrics = group(json!({"Std_bar": 10, "CalStd_bar": 5.0}));
        let table = table(json!({"P_bar": {"slope": 0.5}, "P_Calbar": {"slope": 2.0}}));
        let options = CalibrationOptions {
            skip_calibrated_keys: false,
        };

        let result = calibrate_group(&metrics, &table, "P_", options).unwrap();

        assert_eq!(
            Value::Object(result.entries),
            json!({"CalStd_bar": 5.0, "CalCalStd_bar": 10.0})
        );
    }

    #[test]
    fn test_cal_named_metric_without_original_is_calibrated() {
        let metrics = group(json!({"Calcium": 2.0}));
        let table = table(json!({"P_Calcium": {"slope": 2.0}}));

        let result = calibrate_group(&metrics, &table, "P_", CalibrationOptions::default())
            .unwrap();

        assert_eq!(result.entries.get("CalCalcium"), Some(&json!(4.0)));
    }

    #[test]
    fn test_non_numeric_matched_metric_is_an_error() {
        let metrics = group(json!({"Area": "large"}));
        let table = table(json!({"P_Area": {"slope": 2.0}}));

        let err = calibrate_group(&metrics, &table, "P_", CalibrationOptions::default())
            .unwrap_err();

        assert_eq!(
            err,
            CalibrationError::NonNumericMetric {
                metric: "Area".into(),
                key: "P_Area".into()
            }
        );
    }

    #[test]
    fn test_non_numeric_unmatched_metric_is_ignored() {
        let metrics = group(json!({"Label": "tumour"}));
        let result = calibrate_group(
            &metrics,
            &CalibrationTable::default(),
            "P_",
            CalibrationOptions::default(),
        )
        .unwrap();
        assert!(result.entries.is_empty());
        assert_eq!(result.stats.unmatched, 1);
    }

    #[test]
    fn test_entry_without_slope_is_an_error_when_used() {
        let metrics = group(json!({"Area": 1.0}));
        let table = table(json!({"P_Area": {"intercept": 0.0}}));

        let err = calibrate_group(&metrics, &table, "P_", CalibrationOptions::default())
            .unwrap_err();

        assert_eq!(
            err,
            CalibrationError::MissingSlope {
                key: "P_Area".into()
            }
        );
    }

    #[test]
    fn test_boolean_metric_is_not_numeric() {
        let metrics = group(json!({"Flag": true}));
        let table = table(json!({"P_Flag": {"slope": 2.0}}));

        let err = calibrate_group(&metrics, &table, "P_", CalibrationOptions::default())
            .unwrap_err();

        assert!(matches!(err, CalibrationError::NonNumericMetric { .. }));
    }

    #[test]
    fn test_overflowing_float_is_an_error() {
        let metrics = group(json!({"Area": 1e308}));
        let table = table(json!({"P_Area": {"slope": 1e10}}));

        let err = calibrate_group(&metrics, &table, "P_", CalibrationOptions::default())
            .unwrap_err();

        assert!(matches!(err, CalibrationError::NonFiniteResult { .. }));
    }
}
