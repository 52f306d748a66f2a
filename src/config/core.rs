use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::calibration::CalibrationOptions;
use crate::core::{GroupPrefixes, DEFAULT_GLOBAL_PREFIX, DEFAULT_WEIGHTED_PREFIX};
use crate::io::walker::DEFAULT_EXCLUDE_MARKER;

/// Calibration table used when neither config nor CLI names one
pub const DEFAULT_CALIBRATION_TABLE: &str = "./Calibration.json";

/// Suffix appended to the stem of each calibrated copy
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_calibrated";

/// Indentation of written JSON
pub const DEFAULT_INDENT: usize = 4;

/// Root configuration structure for slidecal
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SlidecalConfig {
    /// Path to the calibration table JSON
    #[serde(default)]
    pub calibration_table: Option<PathBuf>,

    /// Calibration table key prefixes per metric group
    #[serde(default)]
    pub prefixes: Option<PrefixConfig>,

    /// Metrics file discovery
    #[serde(default)]
    pub discovery: Option<DiscoveryConfig>,

    /// Output file naming and formatting
    #[serde(default)]
    pub output: Option<OutputConfig>,

    /// Calibration behaviour
    #[serde(default)]
    pub calibration: Option<CalibrationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PrefixConfig {
    /// Prefix for `weighted_by_rois` metrics
    #[serde(default)]
    pub weighted: Option<String>,

    /// Prefix for `unweighted_global` metrics
    #[serde(default)]
    pub global: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DiscoveryConfig {
    /// Skip JSON files whose parent directory path contains this marker.
    /// An empty string disables the exclusion.
    #[serde(default)]
    pub exclude_marker: Option<String>,

    /// Skip files that already carry the output suffix
    #[serde(default)]
    pub skip_calibrated_outputs: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub suffix: Option<String>,

    #[serde(default)]
    pub indent: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CalibrationConfig {
    /// Do not re-calibrate `Cal<X>` keys produced by an earlier run
    #[serde(default)]
    pub skip_calibrated_keys: Option<bool>,

    /// Continue with the next file when one fails
    #[serde(default)]
    pub keep_going: Option<bool>,
}

impl SlidecalConfig {
    pub fn calibration_table_path(&self) -> PathBuf {
        self.calibration_table
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CALIBRATION_TABLE))
    }

    pub fn group_prefixes(&self) -> GroupPrefixes {
        let prefixes = self.prefixes.clone().unwrap_or_default();
        GroupPrefixes {
            weighted: prefixes
                .weighted
                .unwrap_or_else(|| DEFAULT_WEIGHTED_PREFIX.to_string()),
            global: prefixes
                .global
                .unwrap_or_else(|| DEFAULT_GLOBAL_PREFIX.to_string()),
        }
    }

    pub fn exclude_marker(&self) -> String {
        self.discovery
            .as_ref()
            .and_then(|d| d.exclude_marker.clone())
            .unwrap_or_else(|| DEFAULT_EXCLUDE_MARKER.to_string())
    }

    pub fn skip_calibrated_outputs(&self) -> bool {
        self.discovery
            .as_ref()
            .and_then(|d| d.skip_calibrated_outputs)
            .unwrap_or(true)
    }

    pub fn output_suffix(&self) -> String {
        self.output
            .as_ref()
            .and_then(|o| o.suffix.clone())
            .unwrap_or_else(|| DEFAULT_OUTPUT_SUFFIX.to_string())
    }

    pub fn output_indent(&self) -> usize {
        self.output
            .as_ref()
            .and_then(|o| o.indent)
            .unwrap_or(DEFAULT_INDENT)
    }

    pub fn calibration_options(&self) -> CalibrationOptions {
        let skip_calibrated_keys = self
            .calibration
            .as_ref()
            .and_then(|c| c.skip_calibrated_keys)
            .unwrap_or(CalibrationOptions::default().skip_calibrated_keys);
        CalibrationOptions {
            skip_calibrated_keys,
        }
    }

    pub fn keep_going(&self) -> bool {
        self.calibration
            .as_ref()
            .and_then(|c| c.keep_going)
            .unwrap_or(false)
    }
}
