use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "slidecal")]
#[command(about = "Apply slope calibrations to slide-level metrics JSON", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    /// -v: per-file results
    /// -vv: per-metric calibration decisions
    /// -vvv: everything, including skipped files
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

impl Cli {
    /// The subcommand to run; bare `slidecal` calibrates with an interactive prompt
    pub fn command_or_default(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Calibrate(CalibrateArgs::default()))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Calibrate every metrics JSON file under a directory
    Calibrate(CalibrateArgs),

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct CalibrateArgs {
    /// Directory to search for metrics files (prompted for when omitted)
    pub root: Option<PathBuf>,

    /// Calibration table JSON [default: ./Calibration.json]
    #[arg(short = 'c', long = "calibration", env = "SLIDECAL_CALIBRATION")]
    pub calibration: Option<PathBuf>,

    /// Configuration file (defaults to the nearest .slidecal.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Suffix appended to each output file stem [default: _calibrated]
    #[arg(long)]
    pub suffix: Option<String>,

    /// Skip files under directories whose path contains this marker [default: roiMeta]
    #[arg(long = "exclude")]
    pub exclude_marker: Option<String>,

    /// JSON indentation of written files [default: 4]
    #[arg(long)]
    pub indent: Option<usize>,

    /// Keep processing remaining files when one fails
    #[arg(long = "keep-going")]
    pub keep_going: bool,

    /// Calibrate Cal* keys left by an earlier run like any other metric
    #[arg(long)]
    pub recalibrate: bool,

    /// Also process files that already carry the output suffix
    #[arg(long = "include-outputs")]
    pub include_outputs: bool,
}
