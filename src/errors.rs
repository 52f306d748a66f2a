//! Error types for slidecal operations.
//!
//! Two layers:
//!
//! - [`CalibrationError`]: failures of the pure calibration functions. These
//!   know nothing about files and carry only the metric or key involved.
//! - [`Error`]: everything that can go wrong while running a batch (I/O,
//!   JSON parsing, directory traversal, configuration). File-level variants
//!   carry the path so a failed run names the offending document.
//!
//! Command handlers and `main` wrap these in `anyhow` for context chains.
//!
//! # Example
//!
//! ```rust
//! use slidecal::errors::{CalibrationError, Error};
//! use std::path::PathBuf;
//!
//! let err = Error::calibration("slide_01.json", CalibrationError::MissingMetrics);
//! assert!(err.to_string().contains("slide_01.json"));
//! assert_eq!(err.path(), Some(PathBuf::from("slide_01.json").as_path()));
//! ```

use crate::core::MetricGroup;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the document-level calibration functions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// The document root is not a JSON object
    #[error("metrics document is not a JSON object")]
    NotAnObject,

    /// The document has no top-level `metrics` field
    #[error("metrics document has no `metrics` field")]
    MissingMetrics,

    /// `metrics` exists but is not a JSON object
    #[error("`metrics` field is not a JSON object")]
    InvalidMetrics,

    /// A metric group exists but is not a JSON object
    #[error("metric group `{group}` is not a JSON object")]
    InvalidGroup { group: MetricGroup },

    /// A metric matched a calibration key but its value is not a number
    #[error("metric `{metric}` matched `{key}` but its value is not a number")]
    NonNumericMetric { metric: String, key: String },

    /// The matched calibration entry has no numeric `slope`
    #[error("calibration entry `{key}` has no numeric `slope`")]
    MissingSlope { key: String },

    /// value * slope is not representable in JSON
    #[error("calibrating `{metric}` with `{key}` produced a non-finite value")]
    NonFiniteResult { metric: String, key: String },
}

/// Main error type for slidecal operations
#[derive(Debug, Error)]
pub enum Error {
    /// File could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File could not be written
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid JSON or does not match the expected shape
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A document could not be serialized for output
    #[error("failed to serialize {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Directory traversal failed
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// A document was read but could not be calibrated
    #[error("cannot calibrate {}: {source}", .path.display())]
    Calibration {
        path: PathBuf,
        #[source]
        source: CalibrationError,
    },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// The interactive root prompt failed or got no answer
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// One or more files failed in keep-going mode
    #[error("{failed} of {total} metrics files failed to calibrate")]
    BatchFailed { failed: usize, total: usize },
}

impl Error {
    /// Create a read error with path context
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a write error with path context
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Create a JSON parse error with path context
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }

    /// Attach a document path to a calibration failure
    pub fn calibration(path: impl Into<PathBuf>, source: CalibrationError) -> Self {
        Self::Calibration {
            path: path.into(),
            source,
        }
    }

    /// The file this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::Json { path, .. }
            | Self::Serialize { path, .. }
            | Self::Calibration { path, .. } => Some(path),
            Self::Walk(err) => err.path(),
            Self::Config(_) | Self::Prompt(_) | Self::BatchFailed { .. } => None,
        }
    }
}
