/// Substrings dropped from a metric name before the table lookup
const STRIPPED_MARKERS: [&str; 2] = ["Mean_", "Std_"];

/// Build the calibration table key for a metric.
///
/// Every occurrence of `Mean_` is removed, then every occurrence of `Std_`,
/// and the result is appended to `prefix`. Means and standard deviations of
/// the same measurement therefore share one slope.
///
/// ```rust
/// use slidecal::calibration::derive_calibration_key;
///
/// assert_eq!(
///     derive_calibration_key("SaliencyWtdMean_Area", "CTA.SaliencyWtdMean_"),
///     "CTA.SaliencyWtdMean_SaliencyWtdArea"
/// );
/// assert_eq!(derive_calibration_key("Std_bar", "CTA.Global_"), "CTA.Global_bar");
/// ```
pub fn derive_calibration_key(metric_name: &str, prefix: &str) -> String {
    let stripped = STRIPPED_MARKERS
        .iter()
        .fold(metric_name.to_string(), |name, marker| name.replace(marker, ""));
    format!("{prefix}{stripped}")
}
