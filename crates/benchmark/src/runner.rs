//! Batch benchmark runner.

use crate::dataset::Dataset;
use crate::parser::{DatasetParser, ParseError};
use crate::result::{BenchmarkResult, RunResult};
use rayon::prelude::*;
use rkpack_core::{Config, Solver, Variant};
use rkpack_d3::{Instance, Packer3D};
use std::path::Path;
use thiserror::Error;

/// Errors raised while running a batch.
#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("solver failed on '{instance}': {source}")]
    Solve {
        instance: String,
        #[source]
        source: rkpack_core::Error,
    },
}

/// Configuration for batch runs.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Variants to run on every instance.
    pub variants: Vec<Variant>,
    /// Trials per (instance, variant).
    pub trials: usize,
    /// Trial `t` uses seed `base_seed + t`.
    pub base_seed: u64,
    /// Template for every trial; its seed and variant are overwritten.
    pub solver: Config,
    /// Run the trials of a group on the rayon pool.
    pub parallel: bool,
    /// Whether to print per-trial progress.
    pub show_progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            variants: vec![Variant::A3],
            trials: 10,
            base_seed: 1337,
            solver: Config::default(),
            parallel: false,
            show_progress: true,
        }
    }
}

impl BenchmarkConfig {
    /// Creates a new benchmark configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the variants to run.
    pub fn with_variants(mut self, variants: Vec<Variant>) -> Self {
        self.variants = variants;
        self
    }

    /// Sets the number of trials.
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Sets the base seed.
    pub fn with_base_seed(mut self, seed: u64) -> Self {
        self.base_seed = seed;
        self
    }

    /// Sets the solver template.
    pub fn with_solver_config(mut self, config: Config) -> Self {
        self.solver = config;
        self
    }

    /// Enables parallel trials.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enables or disables progress output.
    pub fn with_show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn trial_config(&self, variant: Variant, trial: usize) -> Config {
        self.solver
            .clone()
            .with_variant(variant)
            .with_seed(self.base_seed.wrapping_add(trial as u64))
    }
}

/// Batch benchmark runner.
pub struct BenchmarkRunner {
    config: BenchmarkConfig,
}

impl BenchmarkRunner {
    /// Creates a new benchmark runner.
    pub fn new(config: BenchmarkConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Runs every `*.json` instance of a folder in case-insensitive name order.
    ///
    /// An empty folder yields an empty result.
    pub fn run_directory(&self, dir: impl AsRef<Path>) -> Result<BenchmarkResult, BenchmarkError> {
        let parser = DatasetParser::new();
        let mut results = BenchmarkResult::new();

        for path in DatasetParser::list_instance_files(dir)? {
            let dataset = parser.parse_file(&path)?;
            log::debug!("loaded {} from {}", dataset.name, path.display());
            for run in self.run_dataset(&dataset)?.runs {
                results.add_run(run);
            }
        }
        Ok(results)
    }

    /// Runs all configured variants and trials on one dataset.
    pub fn run_dataset(&self, dataset: &Dataset) -> Result<BenchmarkResult, BenchmarkError> {
        let instance = dataset.to_instance();
        let mut results = BenchmarkResult::new();

        if self.config.show_progress {
            println!("Running: {} (n={})", instance.name(), instance.len());
        }

        for &variant in &self.config.variants {
            for run in self.run_variant(&instance, variant)? {
                results.add_run(run);
            }
        }
        Ok(results)
    }

    /// Runs the trials of one variant, in trial order.
    pub fn run_variant(
        &self,
        instance: &Instance,
        variant: Variant,
    ) -> Result<Vec<RunResult>, BenchmarkError> {
        let runs = if self.config.parallel {
            let runs = (0..self.config.trials)
                .into_par_iter()
                .map(|t| self.run_trial(instance, variant, t))
                .collect::<Result<Vec<_>, _>>()?;
            for run in &runs {
                self.report(run);
            }
            runs
        } else {
            let mut runs = Vec::with_capacity(self.config.trials);
            for t in 0..self.config.trials {
                let run = self.run_trial(instance, variant, t)?;
                self.report(&run);
                runs.push(run);
            }
            runs
        };
        Ok(runs)
    }

    fn run_trial(
        &self,
        instance: &Instance,
        variant: Variant,
        trial: usize,
    ) -> Result<RunResult, BenchmarkError> {
        let config = self.config.trial_config(variant, trial);
        let packer = Packer3D::new(config.clone());
        let result = packer.solve(instance).map_err(|source| BenchmarkError::Solve {
            instance: instance.name().to_string(),
            source,
        })?;

        Ok(RunResult::from_solve(
            instance.name(),
            trial,
            config.population_size,
            config.time_limit_secs,
            &result,
        ))
    }

    fn report(&self, run: &RunResult) {
        if self.config.show_progress {
            println!(
                "  trial {}: V={:.6}, placed={}, restarts={}, time={:.2}s",
                run.trial, run.best_utilization, run.best_placed, run.restarts, run.time_secs
            );
        }
    }
}
