//! Calibration table loading and lookup.
//!
//! The table is a JSON object mapping qualified metric keys to records with
//! a `slope` field. Only `slope` is read; other fields (intercepts, fit
//! statistics) are ignored. A `slope` is only checked when its entry is
//! actually used, so unused malformed entries never fail a run.

use crate::errors::{Error, Result};
use crate::io;
use serde::Deserialize;
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::path::Path;

/// One record of the calibration table
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CalibrationEntry {
    #[serde(default)]
    slope: Option<Value>,
}

impl CalibrationEntry {
    /// An entry with the given slope; NaN and infinities leave it without one
    pub fn with_slope(slope: f64) -> Self {
        Self {
            slope: Number::from_f64(slope).map(Value::Number),
        }
    }

    /// The slope, if present and numeric
    pub fn slope(&self) -> Option<&Number> {
        match &self.slope {
            Some(Value::Number(n)) => Some(n),
            _ => None,
        }
    }
}

/// Read-only mapping from calibration key to entry
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CalibrationTable {
    entries: HashMap<String, CalibrationEntry>,
}

impl CalibrationTable {
    /// Parse a table from JSON text
    pub fn from_json_str(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str(contents)
    }

    /// Load a table from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = io::read_file(path)?;
        let table = Self::from_json_str(&contents).map_err(|e| Error::json(path, e))?;
        log::info!(
            "Loaded {} calibration entries from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Build a table from `(key, slope)` pairs
    pub fn from_slopes<K: Into<String>>(slopes: impl IntoIterator<Item = (K, f64)>) -> Self {
        slopes
            .into_iter()
            .map(|(key, slope)| (key.into(), CalibrationEntry::with_slope(slope)))
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&CalibrationEntry> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, CalibrationEntry)> for CalibrationTable {
    fn from_iter<I: IntoIterator<Item = (String, CalibrationEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
