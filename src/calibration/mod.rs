//! Slope calibration of metrics documents.
//!
//! A metric is calibrated when the key derived from its name (see
//! [`derive_calibration_key`]) is present in the [`CalibrationTable`]. The
//! calibrated value, `value * slope`, is added to the same group under
//! `Cal<name>`. Unmatched metrics are left as they are.
//!
//! ```rust
//! use serde_json::json;
//! use slidecal::calibration::{calibrate_document, CalibrationOptions, CalibrationTable};
//! use slidecal::core::GroupPrefixes;
//!
//! let table = CalibrationTable::from_slopes([("CTA.Global_bar", 0.5)]);
//! let mut document = json!({"metrics": {"unweighted_global": {"Std_bar": 10}}});
//!
//! let stats = calibrate_document(
//!     &mut document,
//!     &table,
//!     &GroupPrefixes::default(),
//!     CalibrationOptions::default(),
//! )
//! .unwrap();
//!
//! assert_eq!(document["metrics"]["unweighted_global"]["CalStd_bar"], json!(5.0));
//! assert_eq!(stats.calibrated(), 1);
//! ```

pub mod document;
pub mod group;
pub mod key;
pub mod table;

pub use document::{calibrate_document, METRICS_FIELD};
pub use group::{calibrate_group, calibrated_key, GroupCalibration};
pub use key::derive_calibration_key;
pub use table::{CalibrationEntry, CalibrationTable};

/// Switches that change which metrics get calibrated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationOptions {
    /// Leave `Cal<X>` alone when `<X>` is in the same group
    pub skip_calibrated_keys: bool,
}

impl Default for CalibrationOptions {
    fn default() -> Self {
        Self {
            skip_calibrated_keys: true,
        }
    }
}
