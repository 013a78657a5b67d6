//! # rkpack 3D
//!
//! Single-container 3D loading for the rkpack engine.
//!
//! Items are boxes with six axis-aligned rotations. A chromosome of random
//! keys picks a loading order and a rotation per item; the height-field
//! decoder turns that into a gravity-stacked layout and scores it.

pub mod boundary;
pub mod de_packing;
pub mod decoder;
pub mod encoding;
pub mod geometry;
pub mod heightmap;
pub mod instance;
pub mod orientation;
pub mod packer;
pub mod placement;

// Re-exports
pub use boundary::Container;
pub use decoder::{DecoderResult, DecoderWeights, HeightmapDecoder};
pub use geometry::Item;
pub use instance::{Instance, ItemSpec};
pub use orientation::{
    allowed_rotations, apply_orientation, key_to_rotation, resolve_rotation, rotation_to_key,
    vertical_axis, OrientedDims,
};
pub use packer::Packer3D;
pub use placement::{Placement, PlacementStats};
pub use rkpack_core::{Config, Error, Result, SolveResult, Solver, Variant};
