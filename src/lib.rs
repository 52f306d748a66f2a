// Export modules for library usage
pub mod calibration;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod errors;
pub mod io;
pub mod observability;
pub mod progress;

// Re-export commonly used types
pub use crate::calibration::{
    calibrate_document, calibrate_group, derive_calibration_key, CalibrationOptions,
    CalibrationTable,
};
pub use crate::commands::{run, run_with_config, CalibrateConfig};
pub use crate::core::{BatchSummary, CalibrationStats, GroupPrefixes, MetricGroup};
pub use crate::errors::{CalibrationError, Error, Result};
