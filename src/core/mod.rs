pub mod types;

pub use types::{
    BatchSummary, CalibrationStats, GroupPrefixes, GroupStats, MetricGroup,
    CALIBRATED_KEY_PREFIX, DEFAULT_GLOBAL_PREFIX, DEFAULT_WEIGHTED_PREFIX,
};

/// A metric group as stored in a document: metric name to JSON value
pub type MetricMap = serde_json::Map<String, serde_json::Value>;
