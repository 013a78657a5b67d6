//! Axis-aligned box orientations.
//!
//! Rotation indices run `1..=6`; each picks which original dimension ends up
//! on the x (width), y (height) and z (depth) axis.

use crate::geometry::Item;
use rkpack_core::random_key::{bin_midpoint, decode_discrete};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of axis-aligned orientations of a box.
pub const ROTATION_COUNT: u8 = 6;

/// Source axis for (width, height, depth) per rotation, indexed by `r - 1`.
const ORIENTATION_AXES: [(usize, usize, usize); ROTATION_COUNT as usize] = [
    (0, 1, 2), // (w, h, d)
    (0, 2, 1), // (w, d, h)
    (1, 0, 2), // (h, w, d)
    (1, 2, 0), // (h, d, w)
    (2, 0, 1), // (d, w, h)
    (2, 1, 0), // (d, h, w)
];

/// Dimensions of an item after rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OrientedDims {
    /// Extent along x.
    pub width: f64,
    /// Extent along y (vertical).
    pub height: f64,
    /// Extent along z.
    pub depth: f64,
}

impl OrientedDims {
    /// Creates oriented dimensions.
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Returns the volume.
    pub fn volume(&self) -> f64 {
        self.width * self.height * self.depth
    }
}

/// Returns the item's dimensions under rotation `r`.
///
/// Indices outside `1..=6` behave as rotation 1.
pub fn apply_orientation(item: &Item, rotation: u8) -> OrientedDims {
    let dims = item.dimensions();
    let (wi, hi, di) = if (1..=ROTATION_COUNT).contains(&rotation) {
        ORIENTATION_AXES[(rotation - 1) as usize]
    } else {
        ORIENTATION_AXES[0]
    };
    OrientedDims::new(dims[wi], dims[hi], dims[di])
}

/// Returns the source axis (0 = width, 1 = height, 2 = depth) that ends up
/// vertical under rotation `r`.
pub fn vertical_axis(rotation: u8) -> usize {
    if (1..=ROTATION_COUNT).contains(&rotation) {
        ORIENTATION_AXES[(rotation - 1) as usize].1
    } else {
        ORIENTATION_AXES[0].1
    }
}

/// Returns the rotations whose vertical axis is allowed by `vert_ok`, in
/// index order.
pub fn allowed_rotations(vert_ok: [bool; 3]) -> Vec<u8> {
    (1..=ROTATION_COUNT)
        .filter(|&r| vert_ok[vertical_axis(r)])
        .collect()
}

/// Replaces a rotation that stands a forbidden axis upright.
///
/// Allowed rotations are returned unchanged. Otherwise rotation `r` maps to
/// entry `(r - 1) mod k` of the `k` allowed rotations. When no axis may be
/// vertical the rotation is returned as is.
pub fn resolve_rotation(vert_ok: [bool; 3], rotation: u8) -> u8 {
    let r = if (1..=ROTATION_COUNT).contains(&rotation) {
        rotation
    } else {
        1
    };
    if vert_ok[vertical_axis(r)] {
        return r;
    }
    let allowed = allowed_rotations(vert_ok);
    if allowed.is_empty() {
        return r;
    }
    allowed[(r - 1) as usize % allowed.len()]
}

/// Maps a key in `[0, 1]` to a rotation index in `1..=6`.
pub fn key_to_rotation(key: f64) -> u8 {
    decode_discrete(key, ROTATION_COUNT as usize) as u8 + 1
}

/// Maps a rotation index to the midpoint key of its bin.
///
/// The index is clamped to `1..=6` first.
pub fn rotation_to_key(rotation: u8) -> f64 {
    let r = rotation.clamp(1, ROTATION_COUNT);
    bin_midpoint((r - 1) as usize, ROTATION_COUNT as usize)
}
