use crate::errors::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extension of metrics documents
pub const METRICS_EXTENSION: &str = "json";

/// Directory marker for auxiliary ROI metadata output
pub const DEFAULT_EXCLUDE_MARKER: &str = "roiMeta";

/// Recursive discovery of metrics documents under a root directory.
///
/// Files are returned in file-name order within each directory.
pub struct MetricsFileWalker {
    root: PathBuf,
    exclude_marker: Option<String>,
    skip_stem_suffix: Option<String>,
    skip_files: Vec<PathBuf>,
}

impl MetricsFileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            exclude_marker: Some(DEFAULT_EXCLUDE_MARKER.to_string()),
            skip_stem_suffix: None,
            skip_files: vec![],
        }
    }

    /// Skip files whose parent directory path contains `marker`
    pub fn with_exclude_marker(mut self, marker: Option<String>) -> Self {
        self.exclude_marker = marker.filter(|m| !m.is_empty());
        self
    }

    /// Skip files whose stem ends with `suffix` (earlier calibrated outputs)
    pub fn with_skip_stem_suffix(mut self, suffix: Option<String>) -> Self {
        self.skip_stem_suffix = suffix.filter(|s| !s.is_empty());
        self
    }

    /// Never return this file, e.g. the calibration table itself
    pub fn with_skipped_file(mut self, path: &Path) -> Self {
        self.skip_files
            .push(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()));
        self
    }

    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();

            if entry.file_type().is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        log::debug!(
            "Found {} metrics files under {}",
            files.len(),
            self.root.display()
        );
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        if path.extension().and_then(|e| e.to_str()) != Some(METRICS_EXTENSION) {
            return false;
        }

        if let Some(marker) = &self.exclude_marker {
            let parent = path.parent().map(|p| p.to_string_lossy()).unwrap_or_default();
            if parent.contains(marker.as_str()) {
                log::trace!("Skipping {} (in {marker} directory)", path.display());
                return false;
            }
        }

        if let Some(suffix) = &self.skip_stem_suffix {
            let is_output = path
                .file_stem()
                .is_some_and(|stem| stem.to_string_lossy().ends_with(suffix.as_str()));
            if is_output {
                log::trace!("Skipping {} (calibrated output)", path.display());
                return false;
            }
        }

        if !self.skip_files.is_empty() {
            let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            if self.skip_files.contains(&resolved) {
                return false;
            }
        }

        true
    }
}

/// Find metrics documents with the default discovery rules
pub fn find_metrics_files(root: &Path) -> Result<Vec<PathBuf>> {
    MetricsFileWalker::new(root.to_path_buf()).walk()
}
