//! 3D container type.

use nalgebra::Vector3;
use rkpack_core::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The container items are loaded into.
///
/// Axis convention: x = width, y = height (vertical), z = depth. Items rest
/// on the W×D floor and stack upward.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Container {
    /// Dimensions (width, height, depth).
    dimensions: Vector3<f64>,
}

impl Container {
    /// Creates a new container with the given dimensions.
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            dimensions: Vector3::new(width, height, depth),
        }
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

    /// Checks that every dimension is a positive finite number.
    pub fn validate(&self) -> Result<()> {
        if self.dimensions.iter().any(|&d| !d.is_finite() || d <= 0.0) {
            return Err(Error::InvalidBoundary(
                "All container dimensions must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Returns true if the point lies inside or on the container.
    pub fn contains_point(&self, x: f64, y: f64, z: f64) -> bool {
        (0.0..=self.dimensions.x).contains(&x)
            && (0.0..=self.dimensions.y).contains(&y)
            && (0.0..=self.dimensions.z).contains(&z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_container_volume() {
        let container = Container::new(100.0, 80.0, 50.0);
        assert_relative_eq!(container.volume(), 400000.0, epsilon = 0.001);
    }

    #[test]
    fn test_contains_point() {
        let container = Container::new(10.0, 10.0, 10.0);
        assert!(container.contains_point(0.0, 0.0, 0.0));
        assert!(container.contains_point(10.0, 5.0, 10.0));
        assert!(!container.contains_point(10.5, 5.0, 5.0));
        assert!(!container.contains_point(5.0, -0.1, 5.0));
    }

    #[test]
    fn test_validation() {
        assert!(Container::new(100.0, 80.0, 50.0).validate().is_ok());
        assert!(Container::new(-100.0, 80.0, 50.0).validate().is_err());
        assert!(Container::new(100.0, f64::INFINITY, 50.0).validate().is_err());
    }
}
