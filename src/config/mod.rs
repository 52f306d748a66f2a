//! Configuration for slidecal.
//!
//! Values are layered: built-in defaults, then the nearest `.slidecal.toml`
//! (or an explicit `--config` file), then command-line flags. Every section
//! and field is optional; accessors on [`SlidecalConfig`] fill in defaults.

mod core;
mod loader;

pub use core::{
    CalibrationConfig, DiscoveryConfig, OutputConfig, PrefixConfig, SlidecalConfig,
    DEFAULT_CALIBRATION_TABLE, DEFAULT_INDENT, DEFAULT_OUTPUT_SUFFIX,
};
pub use loader::{
    directory_ancestors, discover_config, load_config, load_config_from, parse_config,
    CONFIG_FILE_NAME, DEFAULT_CONFIG_TEMPLATE,
};
