use std::fs;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use super::core::SlidecalConfig;
use crate::errors::{Error, Result};

/// Name of the per-project configuration file
pub const CONFIG_FILE_NAME: &str = ".slidecal.toml";

/// How many directories up from the working directory to look for a config
const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Contents written by `slidecal init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# slidecal configuration

# Calibration table (JSON object of "<prefix><metric>" -> {"slope": ...})
calibration_table = "./Calibration.json"

[prefixes]
weighted = "CTA.SaliencyWtdMean_"
global = "CTA.Global_"

[discovery]
# JSON files under directories whose path contains this marker are skipped
exclude_marker = "roiMeta"
skip_calibrated_outputs = true

[output]
suffix = "_calibrated"
indent = 4

[calibration]
skip_calibrated_keys = true
keep_going = false
"#;

pub(crate) fn read_config_file(path: &Path) -> std::result::Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse config from a TOML string
pub fn parse_config(contents: &str) -> std::result::Result<SlidecalConfig, String> {
    toml::from_str::<SlidecalConfig>(contents)
        .map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))
}

/// Try loading config from a specific path, warning on anything but absence
pub(crate) fn try_load_config_from_path(config_path: &Path) -> Option<SlidecalConfig> {
    let contents = match read_config_file(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!(
                    "Failed to read config file {}: {}",
                    config_path.display(),
                    e
                );
            }
            return None;
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            Some(config)
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// The directory itself followed by its ancestors, at most `max_depth` entries
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Find the nearest config starting from `start`
pub fn discover_config(start: PathBuf) -> SlidecalConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No config found after checking {} directories. Using default config.",
                MAX_TRAVERSAL_DEPTH
            );
            SlidecalConfig::default()
        })
}

/// Load the config for the current working directory
pub fn load_config() -> SlidecalConfig {
    match std::env::current_dir() {
        Ok(current) => discover_config(current),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            SlidecalConfig::default()
        }
    }
}

/// Load an explicitly requested config file; unlike discovery this fails loudly
pub fn load_config_from(path: &Path) -> Result<SlidecalConfig> {
    let contents = read_config_file(path).map_err(|e| Error::read(path, e))?;
    parse_config(&contents).map_err(Error::Config)
}
