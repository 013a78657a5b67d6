//! # rkpack
//!
//! Random-key differential evolution for single-container 3D loading.
//!
//! A chromosome of `2n` keys in `[0, 1]` encodes a loading order and a
//! rotation per item. A height-field decoder stacks items under gravity and
//! scores the layout; four search variants explore the key space:
//!
//! - **H0**: volume-descending baseline followed by random sampling
//! - **A1**: DE/rand/1/bin with fixed F and CR
//! - **A2**: self-adaptive current-to-pbest DE with stagnation restart
//! - **A3**: A2 plus neighborhood local search on the elite
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rkpack::d3::{Container, Instance, ItemSpec, Packer3D};
//! use rkpack::{Config, Solver, Variant};
//!
//! let instance = Instance::from_specs(
//!     "demo",
//!     Container::new(100.0, 80.0, 120.0),
//!     &[ItemSpec::new(0, 20.0, 30.0, 40.0).with_quantity(10)],
//! );
//! let config = Config::default().with_variant(Variant::A3).with_time_limit(5.0);
//! let result = Packer3D::new(config).solve(&instance)?;
//! println!("{}", result.summary(instance.name()));
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization support

/// Core traits and the search engine.
pub use rkpack_core as core;

/// 3D container loading.
pub use rkpack_d3 as d3;

// Re-export commonly used types at root level
pub use rkpack_core::{Config, Error, Result, SolveResult, Solver, Variant};
pub use rkpack_d3::{Container, Instance, Item, Packer3D, Placement};
