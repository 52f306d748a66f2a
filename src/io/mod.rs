pub mod walker;

pub use walker::{find_metrics_files, MetricsFileWalker};

use crate::errors::{Error, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::read(path, e))
}

pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::write(path, e))
}

/// Read and parse a JSON document
pub fn read_json(path: &Path) -> Result<Value> {
    let contents = read_file(path)?;
    serde_json::from_str(&contents).map_err(|e| Error::json(path, e))
}

/// Render a value as pretty JSON indented by `indent` spaces
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T, indent: usize) -> serde_json::Result<String> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    let mut serializer =
        Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(indent.as_bytes()));
    value.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a value as pretty JSON, replacing any existing file
pub fn write_json_pretty<T: Serialize + ?Sized>(path: &Path, value: &T, indent: usize) -> Result<()> {
    let json = to_pretty_json(value, indent).map_err(|source| Error::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    write_file(path, &json)
}

/// Sibling path for the calibrated copy: `<stem><suffix>.json`
pub fn calibrated_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{stem}{suffix}.json"))
}
