//! Dataset types for container loading instances.

use rkpack_d3::{Container, Instance, ItemSpec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Summary information about a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetInfo {
    /// Dataset name
    pub name: String,
    /// Number of item types
    pub item_types: usize,
    /// Total items once quantities are expanded
    pub total_items: usize,
    /// Container volume
    pub container_volume: f64,
    /// Summed item volume over container volume
    pub fill_ratio: f64,
}

/// Container dimensions as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Size along x
    #[serde(rename = "W", alias = "w")]
    pub width: f64,
    /// Vertical size
    #[serde(rename = "H", alias = "h")]
    pub height: f64,
    /// Size along z
    #[serde(rename = "D", alias = "d")]
    pub depth: f64,
}

impl ContainerSpec {
    /// Creates container dimensions.
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Returns the container volume.
    pub fn volume(&self) -> f64 {
        self.width * self.height * self.depth
    }
}

/// An item type in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetItem {
    /// Optional external ID (informational only)
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "Id", alias = "ID")]
    pub id: Option<i64>,
    /// Size along x
    #[serde(rename = "w", alias = "W")]
    pub width: f64,
    /// Vertical size
    #[serde(rename = "h", alias = "H")]
    pub height: f64,
    /// Size along z
    #[serde(rename = "d", alias = "D")]
    pub depth: f64,
    /// Number of copies (at least 1)
    #[serde(rename = "qty", default = "one", skip_serializing_if = "is_one")]
    pub quantity: usize,
    /// Which axis (w, h, d) may stand vertical, stored as `[1, 0, 1]` and
    /// omitted when every axis is allowed
    #[serde(
        default = "all_axes",
        skip_serializing_if = "is_all_axes",
        with = "axis_flags"
    )]
    pub vert_ok: [bool; 3],
}

fn one() -> usize {
    1
}

fn is_one(q: &usize) -> bool {
    *q == 1
}

fn all_axes() -> [bool; 3] {
    [true; 3]
}

fn is_all_axes(flags: &[bool; 3]) -> bool {
    flags.iter().all(|&ok| ok)
}

/// One vertical-axis flag; files use either `0`/`1` or booleans.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub(crate) enum AxisFlag {
    Bool(bool),
    Int(i64),
}

impl AxisFlag {
    pub(crate) fn allowed(self) -> bool {
        match self {
            AxisFlag::Bool(ok) => ok,
            AxisFlag::Int(v) => v != 0,
        }
    }
}

mod axis_flags {
    use super::AxisFlag;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(flags: &[bool; 3], serializer: S) -> Result<S::Ok, S::Error> {
        flags.map(u8::from).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[bool; 3], D::Error> {
        let flags = <[AxisFlag; 3]>::deserialize(deserializer)?;
        Ok(flags.map(AxisFlag::allowed))
    }
}

impl DatasetItem {
    /// Creates a single-copy item.
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            id: None,
            width,
            height,
            depth,
            quantity: 1,
            vert_ok: [true; 3],
        }
    }

    /// Restricts which axes may stand vertical.
    pub fn with_vert_ok(mut self, vert_ok: [bool; 3]) -> Self {
        self.vert_ok = vert_ok;
        self
    }

    /// Sets the number of copies, clamped to at least 1.
    pub fn with_quantity(mut self, quantity: usize) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    /// Volume of one copy.
    pub fn volume(&self) -> f64 {
        self.width * self.height * self.depth
    }
}

/// A parsed container loading instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Instance name
    pub name: String,
    /// Container dimensions
    pub container: ContainerSpec,
    /// Item types in file order
    pub items: Vec<DatasetItem>,
}

impl Dataset {
    /// Returns dataset information.
    pub fn info(&self) -> DatasetInfo {
        let container_volume = self.container.volume();
        let item_volume: f64 = self
            .items
            .iter()
            .map(|i| i.volume() * i.quantity as f64)
            .sum();
        DatasetInfo {
            name: self.name.clone(),
            item_types: self.items.len(),
            total_items: self.total_items(),
            container_volume,
            fill_ratio: if container_volume > 0.0 {
                item_volume / container_volume
            } else {
                0.0
            },
        }
    }

    /// Total items once quantities are expanded.
    pub fn total_items(&self) -> usize {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Builds the solver instance, expanding quantities.
    ///
    /// Copies are laid out in file order and renumbered `0..n`.
    pub fn to_instance(&self) -> Instance {
        let specs: Vec<ItemSpec> = self
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                ItemSpec::new(idx, item.width, item.height, item.depth)
                    .with_quantity(item.quantity)
                    .with_vert_ok(item.vert_ok)
            })
            .collect();
        let c = self.container;
        Instance::from_specs(
            self.name.clone(),
            Container::new(c.width, c.height, c.depth),
            &specs,
        )
    }

    /// Writes the dataset as pretty-printed JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}
