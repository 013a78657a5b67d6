//! # rkpack Core
//!
//! Core abstractions and the search engine for the rkpack container loader.
//!
//! This crate is geometry-agnostic: it knows key vectors, evaluations and
//! search variants, while the 3D crate supplies the decoder.
//!
//! ## Core Components
//!
//! - **Random keys**: permutation and categorical decoding of `[0, 1]` vectors
//! - **DE engine**: `DeRunner` driving the H0/A1/A2/A3 variants over a `DeProblem`
//! - **Local search**: swap / relocate / reverse / rotate hill climbing
//! - **Solver trait**: common configuration, progress reporting and results
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization/deserialization support

pub mod de;
pub mod error;
pub mod local_search;
pub mod random_key;
pub mod result;
pub mod rng;
pub mod solver;

// Re-exports
pub use de::{DeProblem, DeResult, DeRunner, Member};
pub use error::{Error, Result};
pub use local_search::{hill_climb, LocalSearchOutcome, NeighborhoodMove};
pub use result::{Evaluation, SolveResult};
pub use rng::SeededRng;
pub use solver::{Config, ProgressCallback, ProgressInfo, Solver, Variant};
