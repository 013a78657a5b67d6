//! Solve result representation.

use crate::solver::Variant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cached outcome of decoding one key vector.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Evaluation {
    /// Scalar fitness (higher is better).
    pub fitness: f64,
    /// Volume utilization ratio (0.0 - 1.0).
    pub utilization: f64,
    /// Number of items placed.
    pub placed_count: usize,
}

impl Evaluation {
    /// Evaluation of an empty layout.
    pub const EMPTY: Evaluation = Evaluation {
        fitness: 0.0,
        utilization: 0.0,
        placed_count: 0,
    };

    /// Creates a new evaluation.
    pub fn new(fitness: f64, utilization: f64, placed_count: usize) -> Self {
        Self {
            fitness,
            utilization,
            placed_count,
        }
    }
}

/// Result of a packing solve operation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolveResult<P> {
    /// Variant that produced this result.
    pub variant: Variant,

    /// Seed of the run.
    pub seed: u64,

    /// Wall-clock time spent, in seconds.
    pub elapsed_seconds: f64,

    /// Utilization of the best layout found.
    pub best_utilization: f64,

    /// Fitness of the best layout found.
    pub best_fitness: f64,

    /// Items placed by the best layout found.
    pub best_placed_count: usize,

    /// Completed generations (0 for H0).
    pub generation_count: u32,

    /// Decoder evaluations performed.
    pub evaluation_count: u64,

    /// Stagnation restarts triggered (A2 and A3 only).
    #[cfg_attr(feature = "serde", serde(default))]
    pub restarts: u32,

    /// Best fitness after each generation (for analysis).
    pub fitness_history: Vec<f64>,

    /// Layout of the best individual.
    pub placements: Vec<P>,
}

impl<P> SolveResult<P> {
    /// Creates an empty result for a variant and seed.
    pub fn new(variant: Variant, seed: u64) -> Self {
        Self {
            variant,
            seed,
            elapsed_seconds: 0.0,
            best_utilization: 0.0,
            best_fitness: 0.0,
            best_placed_count: 0,
            generation_count: 0,
            evaluation_count: 0,
            restarts: 0,
            fitness_history: Vec::new(),
            placements: Vec::new(),
        }
    }

    /// Sets the best evaluation.
    pub fn with_best(mut self, best: Evaluation) -> Self {
        self.best_fitness = best.fitness;
        self.best_utilization = best.utilization;
        self.best_placed_count = best.placed_count;
        self
    }

    /// Sets the placements of the best layout.
    pub fn with_placements(mut self, placements: Vec<P>) -> Self {
        self.placements = placements;
        self
    }

    /// Returns the best evaluation.
    pub fn best(&self) -> Evaluation {
        Evaluation::new(
            self.best_fitness,
            self.best_utilization,
            self.best_placed_count,
        )
    }

    /// Returns true if the best layout places at least one item.
    pub fn is_successful(&self) -> bool {
        self.best_placed_count > 0
    }

    /// Evaluations per second of wall time.
    pub fn evaluations_per_second(&self) -> f64 {
        self.evaluation_count as f64 / self.elapsed_seconds.max(1e-9)
    }

    /// Multi-line human-readable summary.
    pub fn summary(&self, instance_name: &str) -> String {
        format!(
            "Instance: {}\nVariant: {}\nSeed: {}\nTime(s): {:.3}\nBest V: {:.6}\nBest placed: {}\nEvals: {}\nGens: {}\nRestarts: {}",
            instance_name,
            self.variant,
            self.seed,
            self.elapsed_seconds,
            self.best_utilization,
            self.best_placed_count,
            self.evaluation_count,
            self.generation_count,
            self.restarts
        )
    }
}
