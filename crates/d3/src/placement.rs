//! Placement records produced by the decoder.

use crate::boundary::Container;
use crate::orientation::OrientedDims;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geometric tolerance for overlap and containment checks.
pub const PLACEMENT_EPS: f64 = 1e-12;

/// Position and oriented size of one loaded item.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Placement {
    /// The ID of the placed item.
    pub item_id: usize,
    /// Rotation index (1..=6) used.
    pub rotation: u8,
    /// Lower corner x.
    pub x: f64,
    /// Lower corner y (vertical).
    pub y: f64,
    /// Lower corner z.
    pub z: f64,
    /// Extent along x.
    pub width: f64,
    /// Extent along y.
    pub height: f64,
    /// Extent along z.
    pub depth: f64,
}

impl Placement {
    /// Creates a placement from a lower corner and oriented dimensions.
    pub fn new(item_id: usize, rotation: u8, x: f64, y: f64, z: f64, dims: OrientedDims) -> Self {
        Self {
            item_id,
            rotation,
            x,
            y,
            z,
            width: dims.width,
            height: dims.height,
            depth: dims.depth,
        }
    }

    /// Returns the placed volume.
    pub fn volume(&self) -> f64 {
        self.width * self.height * self.depth
    }

    /// Upper x bound.
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Upper y bound.
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Upper z bound.
    pub fn max_z(&self) -> f64 {
        self.z + self.depth
    }

    /// Returns true if the interiors of the two boxes intersect.
    ///
    /// Boxes that only share a face, edge or corner do not overlap.
    pub fn overlaps(&self, other: &Placement) -> bool {
        let separated = |lo_a: f64, hi_a: f64, lo_b: f64, hi_b: f64| {
            hi_a <= lo_b + PLACEMENT_EPS || hi_b <= lo_a + PLACEMENT_EPS
        };
        !(separated(self.x, self.max_x(), other.x, other.max_x())
            || separated(self.y, self.max_y(), other.y, other.max_y())
            || separated(self.z, self.max_z(), other.z, other.max_z()))
    }

    /// Returns true if the box lies inside the container.
    pub fn is_within(&self, container: &Container) -> bool {
        self.x >= -PLACEMENT_EPS
            && self.y >= -PLACEMENT_EPS
            && self.z >= -PLACEMENT_EPS
            && self.max_x() <= container.width() + PLACEMENT_EPS
            && self.max_y() <= container.height() + PLACEMENT_EPS
            && self.max_z() <= container.depth() + PLACEMENT_EPS
    }
}

/// Placement statistics for a set of placements.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlacementStats {
    /// Total number of placements.
    pub count: usize,
    /// Summed placed volume.
    pub total_volume: f64,
    /// Placements per rotation index, in index order.
    pub rotation_distribution: BTreeMap<u8, usize>,
}

impl PlacementStats {
    /// Computes statistics from a set of placements.
    pub fn from_placements(placements: &[Placement]) -> Self {
        let mut stats = Self {
            count: placements.len(),
            ..Default::default()
        };

        for p in placements {
            stats.total_volume += p.volume();
            *stats.rotation_distribution.entry(p.rotation).or_insert(0) += 1;
        }

        stats
    }
}
