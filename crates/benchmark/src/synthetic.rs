//! Synthetic instance generator.
//!
//! Item sides are drawn from log-normal factors of the container sides, then
//! the whole set is scaled so its volume approaches a target fill ratio.

use crate::dataset::{ContainerSpec, Dataset, DatasetItem};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::LogNormal;
use rkpack_core::{Error, Result};

/// Log-normal (mu, sigma) pairs for the width, height and depth factors.
const FACTOR_PARAMS: [(f64, f64); 3] = [(-0.7, 0.7), (-0.8, 0.8), (-0.9, 0.9)];
const FACTOR_RANGE: (f64, f64) = (0.05, 0.9);
const SCALE_RANGE: (f64, f64) = (0.6, 1.4);
/// Seed distance between consecutive instances of a batch.
const SEED_STRIDE: u64 = 1000;

/// Parameters for a batch of synthetic instances.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticConfig {
    /// Number of instances.
    pub count: usize,
    /// Items per instance.
    pub items: usize,
    /// Target item volume over container volume.
    pub fill_ratio: f64,
    /// Container dimensions.
    pub container: ContainerSpec,
    /// Base seed; instance `k` uses `seed + 1000 * k`.
    pub seed: u64,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            count: 10,
            items: 100,
            fill_ratio: 1.2,
            container: ContainerSpec::new(100.0, 100.0, 100.0),
            seed: 42,
        }
    }
}

impl SyntheticConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of instances.
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    /// Sets the number of items per instance.
    pub fn with_items(mut self, items: usize) -> Self {
        self.items = items;
        self
    }

    /// Sets the target fill ratio.
    pub fn with_fill_ratio(mut self, fill_ratio: f64) -> Self {
        self.fill_ratio = fill_ratio;
        self
    }

    /// Sets the container dimensions.
    pub fn with_container(mut self, width: f64, height: f64, depth: f64) -> Self {
        self.container = ContainerSpec::new(width, height, depth);
        self
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Checks dimensions and fill ratio.
    pub fn validate(&self) -> Result<()> {
        let c = self.container;
        for (label, v) in [("width", c.width), ("height", c.height), ("depth", c.depth)] {
            if !v.is_finite() || v < 1.0 {
                return Err(Error::ConfigError(format!(
                    "container {label} must be at least 1, got {v}"
                )));
            }
        }
        if !self.fill_ratio.is_finite() || self.fill_ratio <= 0.0 {
            return Err(Error::ConfigError(format!(
                "fill ratio must be positive, got {}",
                self.fill_ratio
            )));
        }
        Ok(())
    }

    /// Generates every instance of the batch, named `syn_000`, `syn_001`, ...
    pub fn generate(&self) -> Result<Vec<Dataset>> {
        self.validate()?;
        (0..self.count)
            .map(|k| {
                let seed = self.seed.wrapping_add(SEED_STRIDE.wrapping_mul(k as u64));
                SyntheticGenerator::with_seed(seed).instance(
                    format!("syn_{k:03}"),
                    self.container,
                    self.items,
                    self.fill_ratio,
                )
            })
            .collect()
    }
}

/// Generator for synthetic 3D instances.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    rng: ChaCha8Rng,
}

impl SyntheticGenerator {
    /// Creates a generator with a specific seed for reproducibility.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generates one instance.
    pub fn instance(
        &mut self,
        name: impl Into<String>,
        container: ContainerSpec,
        n_items: usize,
        fill_ratio: f64,
    ) -> Result<Dataset> {
        let dims = [container.width, container.height, container.depth];
        let factors = FACTOR_PARAMS
            .iter()
            .map(|&(mu, sigma)| {
                LogNormal::new(mu, sigma)
                    .map_err(|e| Error::ConfigError(format!("log-normal({mu}, {sigma}): {e}")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut sides: Vec<[f64; 3]> = Vec::with_capacity(n_items);
        for _ in 0..n_items {
            let mut item = [0.0; 3];
            for (axis, dist) in factors.iter().enumerate() {
                let factor = dist.sample(&mut self.rng).clamp(FACTOR_RANGE.0, FACTOR_RANGE.1);
                item[axis] = fit(factor * dims[axis], dims[axis]);
            }
            sides.push(item);
        }

        let volume: f64 = sides.iter().map(|s| s[0] * s[1] * s[2]).sum();
        if volume > 1e-9 {
            let target = fill_ratio * container.volume();
            let scale = (target / volume).cbrt().clamp(SCALE_RANGE.0, SCALE_RANGE.1);
            for item in &mut sides {
                for axis in 0..3 {
                    item[axis] = fit(item[axis] * scale, dims[axis]);
                }
            }
        }

        Ok(Dataset {
            name: name.into(),
            container,
            items: sides
                .into_iter()
                .map(|[w, h, d]| DatasetItem::new(w, h, d))
                .collect(),
        })
    }
}

/// Clamps a side length to `[1, limit]`.
fn fit(side: f64, limit: f64) -> f64 {
    side.max(1.0).min(limit)
}
