//! Instance file parser.

use crate::dataset::{AxisFlag, ContainerSpec, Dataset, DatasetItem};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur when parsing datasets.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid dataset format: {0}")]
    InvalidFormat(String),
}

/// Parser for JSON container loading instances.
///
/// Keys are matched case-insensitively, so `"W"` and `"w"`, or `"Items"` and
/// `"items"`, are interchangeable.
#[derive(Debug, Default)]
pub struct DatasetParser;

impl DatasetParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Parses a dataset from a JSON file.
    ///
    /// A missing or blank `name` falls back to the file stem.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Dataset, ParseError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "instance".to_string());
        self.parse_json_named(&content, &stem)
    }

    /// Parses a dataset from a JSON string.
    pub fn parse_json(&self, json: &str) -> Result<Dataset, ParseError> {
        self.parse_json_named(json, "instance")
    }

    /// Parses a dataset, using `fallback_name` when the file carries none.
    pub fn parse_json_named(&self, json: &str, fallback_name: &str) -> Result<Dataset, ParseError> {
        let value: Value = serde_json::from_str(json)?;
        let raw: RawDataset = serde_json::from_value(lowercase_keys(value))?;
        self.convert_raw_dataset(raw, fallback_name)
    }

    /// Lists the `*.json` files of a folder, sorted case-insensitively.
    pub fn list_instance_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, ParseError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ParseError::InvalidFormat(format!(
                "not a directory: {}",
                dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_json = path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if is_json && path.is_file() {
                files.push(path);
            }
        }
        files.sort_by_key(|p| p.to_string_lossy().to_lowercase());
        Ok(files)
    }

    /// Converts a raw dataset to our format.
    fn convert_raw_dataset(
        &self,
        raw: RawDataset,
        fallback_name: &str,
    ) -> Result<Dataset, ParseError> {
        let container = raw
            .container
            .ok_or_else(|| ParseError::InvalidFormat("missing container".to_string()))?;
        let items = match raw.items {
            Some(items) if !items.is_empty() => items,
            _ => return Err(ParseError::InvalidFormat("missing items".to_string())),
        };

        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| fallback_name.to_string());

        Ok(Dataset {
            name,
            container: ContainerSpec::new(container.w, container.h, container.d),
            items: items
                .into_iter()
                .enumerate()
                .map(|(idx, raw)| self.convert_raw_item(idx, raw))
                .collect::<Result<Vec<_>, ParseError>>()?,
        })
    }

    /// Converts a raw item to our format.
    fn convert_raw_item(&self, idx: usize, raw: RawItem) -> Result<DatasetItem, ParseError> {
        let quantity = raw.qty.unwrap_or(1).max(1) as usize;
        let vert_ok = raw
            .vert_ok
            .map_or([true; 3], |flags| flags.map(AxisFlag::allowed));
        if !vert_ok.iter().any(|&ok| ok) {
            return Err(ParseError::InvalidFormat(format!(
                "item {} allows no vertical axis",
                idx
            )));
        }
        Ok(DatasetItem {
            id: raw.id,
            width: raw.w,
            height: raw.h,
            depth: raw.d,
            quantity,
            vert_ok,
        })
    }
}

/// Lower-cases every object key, recursively.
fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), lowercase_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(values) => Value::Array(values.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

/// Raw dataset as parsed from JSON.
#[derive(Debug, Deserialize)]
struct RawDataset {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    container: Option<RawContainer>,
    #[serde(default)]
    items: Option<Vec<RawItem>>,
}

/// Raw container as parsed from JSON.
#[derive(Debug, Deserialize)]
struct RawContainer {
    w: f64,
    h: f64,
    d: f64,
}

/// Raw item as parsed from JSON.
#[derive(Debug, Deserialize)]
struct RawItem {
    #[serde(default)]
    id: Option<i64>,
    w: f64,
    h: f64,
    d: f64,
    #[serde(default)]
    qty: Option<i64>,
    #[serde(default)]
    vert_ok: Option<[AxisFlag; 3]>,
}
