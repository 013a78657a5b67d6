//! Layout export for a single solve.

use rkpack_core::{SolveResult, Variant};
use rkpack_d3::{Placement, PlacementStats};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Best layout of one solve, with per-rotation counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutReport {
    pub instance: String,
    pub variant: Variant,
    pub seed: u64,
    pub utilization: f64,
    pub placed: usize,
    pub restarts: u32,
    pub stats: PlacementStats,
    pub placements: Vec<Placement>,
}

impl LayoutReport {
    /// Builds the report from a solver result.
    pub fn from_solve(instance: impl Into<String>, result: &SolveResult<Placement>) -> Self {
        Self {
            instance: instance.into(),
            variant: result.variant,
            seed: result.seed,
            utilization: result.best_utilization,
            placed: result.best_placed_count,
            restarts: result.restarts,
            stats: PlacementStats::from_placements(&result.placements),
            placements: result.placements.clone(),
        }
    }

    /// One line such as `r1=3 r6=2`, in rotation order.
    pub fn rotation_summary(&self) -> String {
        if self.stats.rotation_distribution.is_empty() {
            return "none".to_string();
        }
        self.stats
            .rotation_distribution
            .iter()
            .map(|(r, count)| format!("r{}={}", r, count))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Writes the report as pretty JSON.
    pub fn save_json(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }
}
