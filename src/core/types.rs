//! Common type definitions used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// Calibration table prefix for the saliency-weighted group
pub const DEFAULT_WEIGHTED_PREFIX: &str = "CTA.SaliencyWtdMean_";

/// Calibration table prefix for the whole-slide group
pub const DEFAULT_GLOBAL_PREFIX: &str = "CTA.Global_";

/// Prefix added to a metric name to form its calibrated key
pub const CALIBRATED_KEY_PREFIX: &str = "Cal";

/// The two metric groups of a metrics document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricGroup {
    /// Metrics aggregated with per-ROI saliency weighting
    WeightedByRois,
    /// Metrics aggregated over the whole slide
    UnweightedGlobal,
}

impl MetricGroup {
    /// Both groups, in the order they are calibrated
    pub const ALL: [MetricGroup; 2] = [MetricGroup::WeightedByRois, MetricGroup::UnweightedGlobal];

    /// Field name of this group under `metrics`
    pub fn field_name(&self) -> &'static str {
        match self {
            MetricGroup::WeightedByRois => "weighted_by_rois",
            MetricGroup::UnweightedGlobal => "unweighted_global",
        }
    }

    /// Calibration table prefix used when no override is configured
    pub fn default_prefix(&self) -> &'static str {
        match self {
            MetricGroup::WeightedByRois => DEFAULT_WEIGHTED_PREFIX,
            MetricGroup::UnweightedGlobal => DEFAULT_GLOBAL_PREFIX,
        }
    }
}

impl fmt::Display for MetricGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Table prefixes for both groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPrefixes {
    pub weighted: String,
    pub global: String,
}

impl GroupPrefixes {
    pub fn for_group(&self, group: MetricGroup) -> &str {
        match group {
            MetricGroup::WeightedByRois => &self.weighted,
            MetricGroup::UnweightedGlobal => &self.global,
        }
    }
}

impl Default for GroupPrefixes {
    fn default() -> Self {
        Self {
            weighted: DEFAULT_WEIGHTED_PREFIX.to_string(),
            global: DEFAULT_GLOBAL_PREFIX.to_string(),
        }
    }
}

/// Per-group outcome of calibrating one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupStats {
    /// Metrics that matched a table key and received a `Cal` entry
    pub calibrated: usize,
    /// Metrics with no matching table key
    pub unmatched: usize,
    /// Earlier calibration outputs that were left alone
    pub skipped: usize,
}

/// Outcome of calibrating one metrics document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CalibrationStats {
    pub weighted_by_rois: GroupStats,
    pub unweighted_global: GroupStats,
}

impl CalibrationStats {
    pub fn group_mut(&mut self, group: MetricGroup) -> &mut GroupStats {
        match group {
            MetricGroup::WeightedByRois => &mut self.weighted_by_rois,
            MetricGroup::UnweightedGlobal => &mut self.unweighted_global,
        }
    }

    pub fn calibrated(&self) -> usize {
        self.weighted_by_rois.calibrated + self.unweighted_global.calibrated
    }

    pub fn unmatched(&self) -> usize {
        self.weighted_by_rois.unmatched + self.unweighted_global.unmatched
    }
}

/// Totals for a whole batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Metrics files found under the root
    pub discovered: usize,
    /// Calibrated copies written
    pub written: usize,
    /// Files that failed (only non-zero in keep-going mode)
    pub failed: usize,
    /// Calibrated entries added across all files
    pub metrics_calibrated: usize,
    /// Metrics without a table match across all files
    pub metrics_unmatched: usize,
}

impl BatchSummary {
    pub fn record(&mut self, stats: &CalibrationStats) {
        self.written += 1;
        self.metrics_calibrated += stats.calibrated();
        self.metrics_unmatched += stats.unmatched();
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Calibrated {} of {} files ({} metrics calibrated, {} unmatched",
            self.written, self.discovered, self.metrics_calibrated, self.metrics_unmatched
        )?;
        if self.failed > 0 {
            write!(f, ", {} files failed", self.failed)?;
        }
        write!(f, ")")
    }
}
