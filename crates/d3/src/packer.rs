//! 3D container loading solver.

use crate::de_packing::run_de_packing;
use crate::decoder::{DecoderWeights, HeightmapDecoder};
use crate::instance::Instance;
use crate::placement::Placement;
use rkpack_core::solver::{Config, ProgressCallback, Solver};
use rkpack_core::{Result, SolveResult};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// 3D container loading solver.
pub struct Packer3D {
    config: Config,
    decoder: HeightmapDecoder,
    cancelled: Arc<AtomicBool>,
}

impl Packer3D {
    /// Creates a new packer with the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            decoder: HeightmapDecoder::new(),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a packer with default configuration.
    pub fn default_config() -> Self {
        Self::new(Config::default())
    }

    /// Sets the decoder fitness weights.
    pub fn with_weights(mut self, weights: DecoderWeights) -> Self {
        self.decoder = self.decoder.with_weights(weights);
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn run(
        &self,
        instance: &Instance,
        callback: Option<&ProgressCallback>,
    ) -> Result<SolveResult<Placement>> {
        self.config.validate()?;
        instance.validate()?;

        // Reset cancellation flag
        self.cancelled.store(false, Ordering::Relaxed);

        if instance.is_empty() {
            log::warn!(
                "instance '{}' has no items; returning an empty layout",
                instance.name()
            );
            return Ok(SolveResult::new(self.config.variant, self.config.seed));
        }

        let start = Instant::now();
        log::debug!(
            "solving '{}' ({} items) with {} seed={} np={}",
            instance.name(),
            instance.len(),
            self.config.variant,
            self.config.seed,
            self.config.effective_population()
        );

        let mut result = run_de_packing(
            instance,
            &self.config,
            &self.decoder,
            self.cancelled.clone(),
            callback,
        );
        result.elapsed_seconds = start.elapsed().as_secs_f64();
        Ok(result)
    }
}

impl Solver for Packer3D {
    type Instance = Instance;
    type Placement = Placement;

    fn solve(&self, instance: &Instance) -> Result<SolveResult<Placement>> {
        self.run(instance, None)
    }

    fn solve_with_progress(
        &self,
        instance: &Instance,
        callback: ProgressCallback,
    ) -> Result<SolveResult<Placement>> {
        self.run(instance, Some(&callback))
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}
