//! 3D item types.

use crate::orientation::{apply_orientation, resolve_rotation, vertical_axis, OrientedDims};
use nalgebra::Vector3;
use rkpack_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A box to be loaded.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Item {
    /// Identifier, unique within an instance.
    id: usize,

    /// Dimensions (width, height, depth).
    dimensions: Vector3<f64>,

    /// Which source axis (width, height, depth) may stand vertical.
    #[cfg_attr(feature = "serde", serde(default = "all_axes"))]
    vert_ok: [bool; 3],
}

#[cfg(feature = "serde")]
fn all_axes() -> [bool; 3] {
    [true; 3]
}

impl Item {
    /// Creates a new item with the given ID and dimensions.
    pub fn new(id: usize, width: f64, height: f64, depth: f64) -> Self {
        Self {
            id,
            dimensions: Vector3::new(width, height, depth),
            vert_ok: [true; 3],
        }
    }

    /// Restricts which source axes may end up vertical.
    pub fn with_vert_ok(mut self, vert_ok: [bool; 3]) -> Self {
        self.vert_ok = vert_ok;
        self
    }

    /// Returns the vertical-axis permissions (width, height, depth).
    pub fn vert_ok(&self) -> [bool; 3] {
        self.vert_ok
    }

    /// Returns true if rotation `r` keeps an allowed axis vertical.
    pub fn allows_rotation(&self, rotation: u8) -> bool {
        self.vert_ok[vertical_axis(rotation)]
    }

    /// Maps a planned rotation to one this item permits.
    pub fn resolve_rotation(&self, rotation: u8) -> u8 {
        resolve_rotation(self.vert_ok, rotation)
    }

    /// Returns the identifier.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the dimensions (width, height, depth).
    pub fn dimensions(&self) -> &Vector3<f64> {
        &self.dimensions
    }

    /// Returns the width.
    pub fn width(&self) -> f64 {
        self.dimensions.x
    }

    /// Returns the height.
    pub fn height(&self) -> f64 {
        self.dimensions.y
    }

    /// Returns the depth.
    pub fn depth(&self) -> f64 {
        self.dimensions.z
    }

    /// Returns the volume.
    pub fn volume(&self) -> f64 {
        self.dimensions.x * self.dimensions.y * self.dimensions.z
    }

    /// Returns dimensions for a given rotation index.
    pub fn oriented(&self, rotation: u8) -> OrientedDims {
        apply_orientation(self, rotation)
    }

    /// Checks that every dimension is a positive finite number and that at
    /// least one axis may stand vertical.
    pub fn validate(&self) -> Result<()> {
        if self.dimensions.iter().any(|&d| !d.is_finite() || d <= 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "All dimensions for item {} must be positive",
                self.id
            )));
        }
        if !self.vert_ok.iter().any(|&ok| ok) {
            return Err(Error::InvalidGeometry(format!(
                "item {} has no axis allowed vertical",
                self.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_box_volume() {
        let item = Item::new(1, 10.0, 20.0, 30.0);
        assert_relative_eq!(item.volume(), 6000.0, epsilon = 0.001);
        assert_eq!(item.width(), 10.0);
        assert_eq!(item.height(), 20.0);
        assert_eq!(item.depth(), 30.0);
    }

    #[test]
    fn test_oriented() {
        let item = Item::new(1, 10.0, 20.0, 30.0);
        assert_eq!(item.oriented(4), OrientedDims::new(20.0, 30.0, 10.0));
    }

    #[test]
    fn test_validation() {
        assert!(Item::new(0, 10.0, 20.0, 30.0).validate().is_ok());
        assert!(Item::new(1, -10.0, 20.0, 30.0).validate().is_err());
        assert!(Item::new(2, 10.0, 0.0, 30.0).validate().is_err());
        assert!(Item::new(3, 10.0, 20.0, f64::NAN).validate().is_err());
        assert!(Item::new(4, 1.0, 1.0, 1.0)
            .with_vert_ok([false; 3])
            .validate()
            .is_err());
    }

    #[test]
    fn test_vert_ok() {
        let item = Item::new(1, 10.0, 20.0, 30.0);
        assert_eq!(item.vert_ok(), [true; 3]);
        assert!((1..=6).all(|r| item.allows_rotation(r)));

        let upright = item.with_vert_ok([false, true, false]);
        assert!(upright.allows_rotation(1));
        assert!(!upright.allows_rotation(2));
        assert_eq!(upright.resolve_rotation(3), 1);
        assert_eq!(upright.oriented(upright.resolve_rotation(4)).height, 20.0);
    }
}
