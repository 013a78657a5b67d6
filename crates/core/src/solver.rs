//! Solver traits and configuration.

use crate::result::SolveResult;
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Search variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Variant {
    /// Decoder-only baseline: one volume-descending pass, then random sampling.
    H0,
    /// Classic DE/rand/1/bin with fixed F and CR.
    A1,
    /// Self-adaptive current-to-pbest DE with stagnation restart.
    A2,
    /// A2 plus neighborhood local search on the elite.
    #[default]
    A3,
}

impl Variant {
    /// All variants, in ablation order.
    pub const ALL: [Variant; 4] = [Variant::H0, Variant::A1, Variant::A2, Variant::A3];

    /// Short label used in reports.
    pub fn label(self) -> &'static str {
        match self {
            Variant::H0 => "H0",
            Variant::A1 => "A1",
            Variant::A2 => "A2",
            Variant::A3 => "A3",
        }
    }

    /// Whether this variant carries per-individual F/CR.
    pub fn is_self_adaptive(self) -> bool {
        matches!(self, Variant::A2 | Variant::A3)
    }

    /// Whether this variant runs local search on the elite.
    pub fn uses_local_search(self) -> bool {
        matches!(self, Variant::A3)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "H0" => Ok(Variant::H0),
            "A1" => Ok(Variant::A1),
            "A2" => Ok(Variant::A2),
            "A3" => Ok(Variant::A3),
            other => Err(Error::ConfigError(format!(
                "unknown variant '{other}' (expected H0, A1, A2 or A3)"
            ))),
        }
    }
}

/// Smallest population the DE variants will run with.
pub const MIN_POPULATION: usize = 10;

/// Configuration for a search run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Seed for the run's random stream.
    pub seed: u64,

    /// Wall-clock budget in seconds.
    pub time_limit_secs: f64,

    /// Population size NP (raised to [`MIN_POPULATION`] when smaller).
    pub population_size: usize,

    /// Generation cap (`None` = bounded by time only).
    pub max_generations: Option<u32>,

    /// Search variant.
    pub variant: Variant,

    /// Elite fraction for the pbest pool.
    pub pbest_fraction: f64,

    // A1 parameters
    /// Fixed mutation factor.
    pub fixed_f: f64,

    /// Fixed crossover rate.
    pub fixed_cr: f64,

    // A2/A3 parameters
    /// Lower bound when redrawing F.
    pub f_lower: f64,

    /// Upper bound when redrawing F.
    pub f_upper: f64,

    /// Probability of redrawing F each generation.
    pub tau1: f64,

    /// Probability of redrawing CR each generation.
    pub tau2: f64,

    // A3 local search
    /// Neighborhood moves per local-search call.
    pub local_search_moves: usize,

    /// Fraction of the population that receives local search.
    pub local_search_top_fraction: f64,

    // Restart
    /// Generations without improvement before a restart.
    pub stagnation_generations: u32,

    /// Fraction of the population reinitialized on restart.
    pub restart_worst_fraction: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: 42,
            time_limit_secs: 30.0,
            population_size: 80,
            max_generations: None,
            variant: Variant::default(),
            pbest_fraction: 0.2,
            fixed_f: 0.6,
            fixed_cr: 0.9,
            f_lower: 0.1,
            f_upper: 0.9,
            tau1: 0.1,
            tau2: 0.1,
            local_search_moves: 30,
            local_search_top_fraction: 0.1,
            stagnation_generations: 50,
            restart_worst_fraction: 0.2,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the time limit in seconds.
    pub fn with_time_limit(mut self, secs: f64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the generation cap.
    pub fn with_max_generations(mut self, generations: u32) -> Self {
        self.max_generations = Some(generations);
        self
    }

    /// Sets the variant.
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Sets the elite fraction for pbest selection.
    pub fn with_pbest_fraction(mut self, fraction: f64) -> Self {
        self.pbest_fraction = fraction;
        self
    }

    /// Sets the fixed F and CR used by A1.
    pub fn with_fixed_parameters(mut self, f: f64, cr: f64) -> Self {
        self.fixed_f = f;
        self.fixed_cr = cr;
        self
    }

    /// Sets the self-adaptive F range.
    pub fn with_f_range(mut self, lower: f64, upper: f64) -> Self {
        self.f_lower = lower;
        self.f_upper = upper;
        self
    }

    /// Sets the F/CR redraw probabilities.
    pub fn with_tau(mut self, tau1: f64, tau2: f64) -> Self {
        self.tau1 = tau1;
        self.tau2 = tau2;
        self
    }

    /// Sets the local search budget.
    pub fn with_local_search(mut self, moves: usize, top_fraction: f64) -> Self {
        self.local_search_moves = moves;
        self.local_search_top_fraction = top_fraction;
        self
    }

    /// Sets the restart policy.
    pub fn with_restart(mut self, stagnation_generations: u32, worst_fraction: f64) -> Self {
        self.stagnation_generations = stagnation_generations;
        self.restart_worst_fraction = worst_fraction;
        self
    }

    /// Returns the time limit as a [`Duration`].
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Returns the effective population size.
    pub fn effective_population(&self) -> usize {
        self.population_size.max(MIN_POPULATION)
    }

    /// Returns the size of the pbest pool (at least 2).
    pub fn elite_count(&self) -> usize {
        let np = self.effective_population();
        (((np as f64) * self.pbest_fraction).ceil() as usize).clamp(2, np)
    }

    /// Returns how many individuals receive local search (at least 1).
    pub fn local_search_count(&self) -> usize {
        let np = self.effective_population();
        (((np as f64) * self.local_search_top_fraction).ceil() as usize).clamp(1, np)
    }

    /// Returns how many individuals are reinitialized on restart (at least 1).
    pub fn restart_count(&self) -> usize {
        let np = self.effective_population();
        (((np as f64) * self.restart_worst_fraction).floor() as usize).clamp(1, np)
    }

    /// Checks that every option is in range.
    pub fn validate(&self) -> Result<()> {
        if !self.time_limit_secs.is_finite() || self.time_limit_secs < 0.0 {
            return Err(Error::ConfigError(format!(
                "time limit must be a non-negative number of seconds, got {}",
                self.time_limit_secs
            )));
        }
        if self.population_size == 0 {
            return Err(Error::ConfigError(
                "population size must be at least 1".into(),
            ));
        }

        let fractions = [
            ("pbest_fraction", self.pbest_fraction),
            ("fixed_cr", self.fixed_cr),
            ("tau1", self.tau1),
            ("tau2", self.tau2),
            ("local_search_top_fraction", self.local_search_top_fraction),
            ("restart_worst_fraction", self.restart_worst_fraction),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::ConfigError(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }

        if !self.fixed_f.is_finite() || self.fixed_f < 0.0 {
            return Err(Error::ConfigError(format!(
                "fixed_f must be non-negative, got {}",
                self.fixed_f
            )));
        }
        if !(self.f_lower >= 0.0 && self.f_lower <= self.f_upper && self.f_upper.is_finite()) {
            return Err(Error::ConfigError(format!(
                "F range [{}, {}] is invalid",
                self.f_lower, self.f_upper
            )));
        }

        Ok(())
    }
}

/// Progress callback for long-running operations.
pub type ProgressCallback = Box<dyn Fn(ProgressInfo) + Send + Sync>;

/// Progress information during solving.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Current generation.
    pub generation: u32,
    /// Best fitness so far.
    pub best_fitness: f64,
    /// Mean fitness of the current population.
    pub avg_fitness: f64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// Whether the solver is still running.
    pub running: bool,
}

/// Trait for packing solvers.
pub trait Solver {
    /// The problem instance this solver handles.
    type Instance;
    /// The placement record produced for the best layout.
    type Placement;

    /// Solves the instance within the configured budget.
    fn solve(&self, instance: &Self::Instance) -> Result<SolveResult<Self::Placement>>;

    /// Solves with a progress callback invoked once per generation.
    fn solve_with_progress(
        &self,
        instance: &Self::Instance,
        callback: ProgressCallback,
    ) -> Result<SolveResult<Self::Placement>>;

    /// Cancels an ongoing solve operation.
    fn cancel(&self);
}
