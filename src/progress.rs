//! Progress feedback for calibration runs.
//!
//! A single `indicatif` bar tracks files through a batch.
//!
//! - **Quiet Mode**: no progress output (`--quiet` or the `SLIDECAL_QUIET` env var)
//! - **Non-TTY**: the bar is hidden in CI and piped output; per-file lines are
//!   still printed to stdout
//!
//! # Examples
//!
//! ```rust,no_run
//! use slidecal::progress::{ProgressConfig, ProgressManager, TEMPLATE_FILES};
//!
//! let manager = ProgressManager::new(ProgressConfig::from_env(false));
//! let progress = manager.create_bar(3, TEMPLATE_FILES);
//! for name in ["a.json", "b.json", "c.json"] {
//!     manager.line(&progress, &format!("Processing file: {name}"));
//!     progress.inc(1);
//! }
//! progress.finish_and_clear();
//! ```

use indicatif::{ProgressBar, ProgressStyle};

pub const TEMPLATE_FILES: &str = "{spinner} {msg} [{bar:30}] {pos}/{len} files ({percent}%)";

/// Configuration for progress display behavior
#[derive(Debug, Clone, Default)]
pub struct ProgressConfig {
    /// Whether to suppress all progress output
    pub quiet_mode: bool,
}

impl ProgressConfig {
    /// Create progress configuration from environment and CLI arguments
    pub fn from_env(quiet: bool) -> Self {
        let env_quiet = std::env::var("SLIDECAL_QUIET").is_ok();
        Self {
            quiet_mode: quiet || env_quiet,
        }
    }

    /// Determine if the progress bar should be drawn
    pub fn should_show_progress(&self) -> bool {
        if self.quiet_mode {
            return false;
        }

        use std::io::IsTerminal;
        std::io::stderr().is_terminal()
    }
}

/// Creates progress bars and routes per-file messages around them
#[derive(Debug, Clone)]
pub struct ProgressManager {
    config: ProgressConfig,
}

impl ProgressManager {
    pub fn new(config: ProgressConfig) -> Self {
        Self { config }
    }

    /// Create a progress bar with the given length and template
    ///
    /// Returns a hidden progress bar if progress should not be shown
    pub fn create_bar(&self, len: u64, template: &str) -> ProgressBar {
        if !self.config.should_show_progress() {
            return ProgressBar::hidden();
        }

        let style = match ProgressStyle::default_bar().template(template) {
            Ok(style) => style.progress_chars("█▓▒░  "),
            Err(e) => {
                log::warn!("Invalid progress bar template: {e}");
                ProgressStyle::default_bar()
            }
        };
        let pb = ProgressBar::new(len);
        pb.set_style(style);
        pb
    }

    /// Print a per-file line without tearing the bar.
    ///
    /// Suppressed entirely in quiet mode.
    pub fn line(&self, bar: &ProgressBar, message: &str) {
        if self.config.quiet_mode {
            return;
        }
        if bar.is_hidden() {
            println!("{message}");
        } else {
            bar.println(message);
        }
    }
}
