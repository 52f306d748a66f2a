//! Batch calibration of a directory tree of metrics documents.

use crate::calibration::{calibrate_document, CalibrationOptions, CalibrationTable};
use crate::cli::CalibrateArgs;
use crate::config::{self, SlidecalConfig};
use crate::core::{BatchSummary, CalibrationStats, GroupPrefixes};
use crate::errors::{Error, Result};
use crate::io::{self, MetricsFileWalker};
use crate::observability::{self, RunPhase};
use crate::progress::{ProgressConfig, ProgressManager, TEMPLATE_FILES};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// Question asked when no root directory is given
pub const ROOT_PROMPT: &str = "Enter the path to the directory containing metrics JSON files: ";

/// Fully resolved settings for one batch run
#[derive(Debug, Clone)]
pub struct CalibrateConfig {
    pub root: PathBuf,
    pub calibration_table: PathBuf,
    pub prefixes: GroupPrefixes,
    pub options: CalibrationOptions,
    /// Parent-path marker of directories to skip; `None` disables the check
    pub exclude_marker: Option<String>,
    pub skip_calibrated_outputs: bool,
    pub output_suffix: String,
    pub indent: usize,
    pub keep_going: bool,
    pub quiet: bool,
}

impl CalibrateConfig {
    /// Settings for `root` and `calibration_table` with every default applied
    pub fn new(root: impl Into<PathBuf>, calibration_table: impl Into<PathBuf>) -> Self {
        let mut config = Self::from_settings(root.into(), &SlidecalConfig::default());
        config.calibration_table = calibration_table.into();
        config
    }

    /// Settings for `root` taken from a loaded config file
    pub fn from_settings(root: PathBuf, settings: &SlidecalConfig) -> Self {
        Self {
            root,
            calibration_table: settings.calibration_table_path(),
            prefixes: settings.group_prefixes(),
            options: settings.calibration_options(),
            exclude_marker: Some(settings.exclude_marker()).filter(|m| !m.is_empty()),
            skip_calibrated_outputs: settings.skip_calibrated_outputs(),
            output_suffix: settings.output_suffix(),
            indent: settings.output_indent(),
            keep_going: settings.keep_going(),
            quiet: false,
        }
    }

    /// Apply command-line overrides on top of the config file
    pub fn with_args(mut self, args: &CalibrateArgs) -> Self {
        if let Some(table) = &args.calibration {
            self.calibration_table = table.clone();
        }
        if let Some(suffix) = &args.suffix {
            self.output_suffix = suffix.clone();
        }
        if let Some(marker) = &args.exclude_marker {
            self.exclude_marker = Some(marker.clone()).filter(|m| !m.is_empty());
        }
        if let Some(indent) = args.indent {
            self.indent = indent;
        }
        self.keep_going |= args.keep_going;
        if args.recalibrate {
            self.options.skip_calibrated_keys = false;
        }
        if args.include_outputs {
            self.skip_calibrated_outputs = false;
        }
        self
    }

    /// Suppress per-file lines, the progress bar and the summary
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }
}

/// Entry point for `slidecal calibrate`
pub fn handle_calibrate(args: CalibrateArgs, quiet: bool) -> anyhow::Result<()> {
    let settings = match &args.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config(),
    };

    let root = match &args.root {
        Some(root) => root.clone(),
        None => {
            let stdin = std::io::stdin();
            prompt_for_root(stdin.lock(), std::io::stdout())?
        }
    };

    let config = CalibrateConfig::from_settings(root, &settings)
        .with_args(&args)
        .with_quiet(quiet);
    let summary = run_with_config(&config)?;

    if !config.quiet {
        println!("{summary}");
    }
    Ok(())
}

/// Ask for the root directory on `output` and read one line from `input`
pub fn prompt_for_root<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<PathBuf> {
    write!(output, "{ROOT_PROMPT}")
        .and_then(|_| output.flush())
        .map_err(|e| Error::Prompt(e.to_string()))?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| Error::Prompt(e.to_string()))?;
    if read == 0 {
        return Err(Error::Prompt("no directory given".to_string()));
    }

    // An empty answer is the current directory
    let answer = line.trim();
    Ok(PathBuf::from(if answer.is_empty() { "." } else { answer }))
}

/// Calibrate every metrics file under `root` with the table at `calibration_table`
pub fn run(root: &Path, calibration_table: &Path) -> Result<BatchSummary> {
    run_with_config(&CalibrateConfig::new(root, calibration_table).with_quiet(true))
}

/// Discover, calibrate and write every metrics file described by `config`.
///
/// Without `keep_going` the first failing file ends the run; files written
/// before it stay on disk. With `keep_going` failures are logged and the run
/// ends with [`Error::BatchFailed`] once every file has been tried.
pub fn run_with_config(config: &CalibrateConfig) -> Result<BatchSummary> {
    observability::reset_context();

    let files = discover_files(config)?;
    let mut summary = BatchSummary {
        discovered: files.len(),
        ..Default::default()
    };
    if files.is_empty() {
        log::warn!("No metrics files found under {}", config.root.display());
        return Ok(summary);
    }

    let table = {
        let _phase = observability::set_phase(RunPhase::TableLoading);
        CalibrationTable::load(&config.calibration_table)?
    };

    let progress = ProgressManager::new(ProgressConfig::from_env(config.quiet));
    let bar = progress.create_bar(files.len() as u64, TEMPLATE_FILES);
    bar.set_message("Calibrating");
    observability::set_progress(0, files.len());

    for file in &files {
        let _file = observability::set_current_file(file);
        progress.line(&bar, &format!("Processing file: {}", file.display()));

        match calibrate_file(file, &table, config) {
            Ok((output, stats)) => {
                summary.record(&stats);
                progress.line(
                    &bar,
                    &format!("Calibrated metrics saved to: {}", output.display()),
                );
            }
            Err(e) if config.keep_going => {
                log::error!("{e}");
                summary.failed += 1;
            }
            Err(e) => {
                bar.abandon();
                return Err(e);
            }
        }

        observability::increment_processed();
        bar.inc(1);
    }
    bar.finish_and_clear();

    if summary.failed > 0 {
        log::warn!("{summary}");
        return Err(Error::BatchFailed {
            failed: summary.failed,
            total: summary.discovered,
        });
    }
    Ok(summary)
}

fn discover_files(config: &CalibrateConfig) -> Result<Vec<PathBuf>> {
    let _phase = observability::set_phase(RunPhase::Discovery);

    let skip_suffix = config
        .skip_calibrated_outputs
        .then(|| config.output_suffix.clone());
    MetricsFileWalker::new(config.root.clone())
        .with_exclude_marker(config.exclude_marker.clone())
        .with_skip_stem_suffix(skip_suffix)
        .with_skipped_file(&config.calibration_table)
        .walk()
}

/// Calibrate one document and write its sibling copy.
///
/// Returns the output path and what was calibrated.
pub fn calibrate_file(
    path: &Path,
    table: &CalibrationTable,
    config: &CalibrateConfig,
) -> Result<(PathBuf, CalibrationStats)> {
    let mut document = {
        let _phase = observability::set_phase(RunPhase::Calibrating);
        io::read_json(path)?
    };

    let stats = calibrate_document(&mut document, table, &config.prefixes, config.options)
        .map_err(|e| Error::calibration(path, e))?;

    let output = io::calibrated_output_path(path, &config.output_suffix);
    {
        let _phase = observability::set_phase(RunPhase::Writing);
        io::write_json_pretty(&output, &document, config.indent)?;
    }

    log::info!(
        "{}: {} calibrated, {} unmatched",
        path.display(),
        stats.calibrated(),
        stats.unmatched()
    );
    Ok((output, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, value: &Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, value.to_string()).unwrap();
    }

    fn fixture() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("Calibration.json");
        write(
            &table,
            &json!({
                "CTA.SaliencyWtdMean_foo": {"slope": 1.5},
                "CTA.Global_bar": {"slope": 0.5}
            }),
        );
        (dir, table)
    }

    #[test]
    fn test_prompt_reads_trimmed_line() {
        let mut shown = Vec::new();
        let root = prompt_for_root("  /data/slides \n".as_bytes(), &mut shown).unwrap();

        assert_eq!(root, PathBuf::from("/data/slides"));
        assert_eq!(String::from_utf8(shown).unwrap(), ROOT_PROMPT);
    }

    #[test]
    fn test_prompt_empty_answer_is_current_directory() {
        let root = prompt_for_root("  \n".as_bytes(), Vec::new()).unwrap();
        assert_eq!(root, PathBuf::from("."));
    }

    #[test]
    fn test_prompt_rejects_closed_input() {
        let err = prompt_for_root("".as_bytes(), Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Prompt(_)));
    }

    #[test]
    fn test_run_writes_sibling_files() {
        let (dir, table) = fixture();
        let input = dir.path().join("slides/s1/results.json");
        write(
            &input,
            &json!({"metrics": {"weighted_by_rois": {"Mean_foo": 2.0}, "unweighted_global": {"Std_bar": 10}}}),
        );

        let summary = run(&dir.path().join("slides"), &table).unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(summary.metrics_calibrated, 2);
        let output: Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("slides/s1/results_calibrated.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(output["metrics"]["weighted_by_rois"]["CalMean_foo"], json!(3.0));
        assert_eq!(output["metrics"]["unweighted_global"]["CalStd_bar"], json!(5.0));
    }

    #[test]
    fn test_run_without_files_does_not_need_a_table() {
        let dir = TempDir::new().unwrap();
        let summary = run(dir.path(), &dir.path().join("missing.json")).unwrap();
        assert_eq!(summary, BatchSummary::default());
    }

    #[test]
    fn test_run_fails_fast_by_default() {
        let (dir, table) = fixture();
        let root = dir.path().join("slides");
        write(&root.join("a/results.json"), &json!({"metrics": {}}));
        write(&root.join("b/results.json"), &json!({"no_metrics": true}));
        write(&root.join("c/results.json"), &json!({"metrics": {}}));

        let err = run(&root, &table).unwrap_err();

        assert!(matches!(err, Error::Calibration { .. }));
        assert!(root.join("a/results_calibrated.json").exists());
        assert!(!root.join("c/results_calibrated.json").exists());
    }

    #[test]
    fn test_keep_going_processes_remaining_files() {
        let (dir, table) = fixture();
        let root = dir.path().join("slides");
        write(&root.join("a/results.json"), &json!({"metrics": {}}));
        fs::write(root.join("a/broken.json"), "{").unwrap();
        write(&root.join("b/results.json"), &json!({"metrics": {}}));

        let mut config = CalibrateConfig::new(&root, &table).with_quiet(true);
        config.keep_going = true;
        let err = run_with_config(&config).unwrap_err();

        assert!(matches!(err, Error::BatchFailed { failed: 1, total: 3 }));
        assert!(root.join("a/results_calibrated.json").exists());
        assert!(root.join("b/results_calibrated.json").exists());
    }

    #[test]
    fn test_rerun_skips_outputs_and_adds_nothing() {
        let (dir, table) = fixture();
        let root = dir.path().join("slides");
        let input = root.join("results.json");
        write(&input, &json!({"metrics": {"unweighted_global": {"Std_bar": 10}}}));

        run(&root, &table).unwrap();
        let first = fs::read_to_string(root.join("results_calibrated.json")).unwrap();
        let summary = run(&root, &table).unwrap();
        let second = fs::read_to_string(root.join("results_calibrated.json")).unwrap();

        assert_eq!(summary.discovered, 1);
        assert_eq!(first, second);
        assert!(!root.join("results_calibrated_calibrated.json").exists());
    }

    #[test]
    fn test_table_inside_root_is_not_processed() {
        let (dir, table) = fixture();
        write(&dir.path().join("results.json"), &json!({"metrics": {}}));

        let summary = run(dir.path(), &table).unwrap();

        assert_eq!(summary.discovered, 1);
        assert!(!dir.path().join("Calibration_calibrated.json").exists());
    }

    #[test]
    fn test_args_override_settings() {
        let settings = SlidecalConfig::default();
        let args = CalibrateArgs {
            calibration: Some(PathBuf::from("other.json")),
            exclude_marker: Some(String::new()),
            indent: Some(2),
            recalibrate: true,
            include_outputs: true,
            ..Default::default()
        };

        let config = CalibrateConfig::from_settings(PathBuf::from("."), &settings).with_args(&args);

        assert_eq!(config.calibration_table, PathBuf::from("other.json"));
        assert_eq!(config.exclude_marker, None);
        assert_eq!(config.indent, 2);
        assert!(!config.options.skip_calibrated_keys);
        assert!(!config.skip_calibrated_outputs);
        assert_eq!(config.output_suffix, "_calibrated");
    }
}
