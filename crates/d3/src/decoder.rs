//! Height-field placement decoder.
//!
//! Turns a loading order and rotation plan into a concrete layout. Items are
//! taken in order; each is put at the lowest, then front-most, then left-most
//! feasible corner among the origin and the right/back edges of boxes placed
//! so far. Items with no feasible corner are skipped.

use crate::heightmap::HeightGrid;
use crate::instance::Instance;
use crate::placement::{Placement, PLACEMENT_EPS};
use rkpack_core::result::Evaluation;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Secondary weights of the fitness function.
///
/// `f = V + placed·(count/n) − height·(Hmax/H) − depth·(Dmax/D)` where `V` is
/// the volume utilization.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DecoderWeights {
    /// Bonus per placed fraction of items.
    pub placed: f64,
    /// Penalty on the relative stack height.
    pub height: f64,
    /// Penalty on the relative depth extent.
    pub depth: f64,
}

impl Default for DecoderWeights {
    fn default() -> Self {
        Self {
            placed: 1e-4,
            height: 1e-6,
            depth: 1e-6,
        }
    }
}

/// Layout and scores produced by one decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderResult {
    /// Placed volume over container volume.
    pub utilization: f64,
    /// Number of items placed.
    pub placed_count: usize,
    /// Highest top surface.
    pub max_height: f64,
    /// Largest z extent reached.
    pub max_depth: f64,
    /// Scalar fitness (higher is better).
    pub fitness: f64,
    /// Placements in loading order.
    pub placements: Vec<Placement>,
}

impl DecoderResult {
    /// Returns the cached scores without the layout.
    pub fn evaluation(&self) -> Evaluation {
        Evaluation::new(self.fitness, self.utilization, self.placed_count)
    }
}

/// Best corner seen so far for the current item.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    x: f64,
    y: f64,
    z: f64,
    resulting_max_height: f64,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        let eq = |a: f64, b: f64| (a - b).abs() <= PLACEMENT_EPS;
        let lt = |a: f64, b: f64| a < b - PLACEMENT_EPS;

        lt(self.y, other.y)
            || (eq(self.y, other.y) && lt(self.z, other.z))
            || (eq(self.y, other.y) && eq(self.z, other.z) && lt(self.x, other.x))
            || (eq(self.y, other.y)
                && eq(self.z, other.z)
                && eq(self.x, other.x)
                && lt(self.resulting_max_height, other.resulting_max_height))
    }
}

/// Deterministic height-field decoder.
#[derive(Debug, Clone, Default)]
pub struct HeightmapDecoder {
    weights: DecoderWeights,
}

impl HeightmapDecoder {
    /// Creates a decoder with default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fitness weights.
    pub fn with_weights(mut self, weights: DecoderWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Returns the fitness weights.
    pub fn weights(&self) -> &DecoderWeights {
        &self.weights
    }

    /// Decodes an order and rotation plan into a layout.
    ///
    /// `order` is a permutation of item indices; `plan[i]` is the rotation
    /// of item `i` (not of position `i`). A rotation that stands an axis
    /// upright which the item forbids is replaced by an allowed one, and the
    /// placement records the rotation actually used.
    pub fn evaluate(&self, instance: &Instance, order: &[usize], plan: &[u8]) -> DecoderResult {
        let container = instance.container();
        let (cw, ch, cd) = (container.width(), container.height(), container.depth());
        let items = instance.items();
        let n = items.len();

        let mut grid = HeightGrid::new(cw, cd);
        let mut placements: Vec<Placement> = Vec::with_capacity(n);
        let mut xs_candidates = vec![0.0];
        let mut zs_candidates = vec![0.0];

        let mut placed_volume = 0.0;
        let mut max_height: f64 = 0.0;
        let mut max_depth: f64 = 0.0;

        for &idx in order {
            let item = &items[idx];
            let rotation = item.resolve_rotation(plan.get(idx).copied().unwrap_or(1));
            let dims = item.oriented(rotation);

            let mut best: Option<Candidate> = None;
            for &x in &xs_candidates {
                if x + dims.width > cw + PLACEMENT_EPS {
                    continue;
                }
                for &z in &zs_candidates {
                    if z + dims.depth > cd + PLACEMENT_EPS {
                        continue;
                    }
                    let y = grid.max_over(x, x + dims.width, z, z + dims.depth);
                    if y + dims.height > ch + PLACEMENT_EPS {
                        continue;
                    }

                    let candidate = Candidate {
                        x,
                        y,
                        z,
                        resulting_max_height: max_height.max(y + dims.height),
                    };
                    if best.map_or(true, |b| candidate.beats(&b)) {
                        best = Some(candidate);
                    }
                }
            }

            let Some(Candidate { x, y, z, .. }) = best else {
                continue;
            };

            let (x1, z1) = (x + dims.width, z + dims.depth);
            grid.insert_breakpoints(x, x1, z, z1);
            grid.set_over(x, x1, z, z1, y + dims.height);

            insert_candidate(&mut xs_candidates, x1);
            insert_candidate(&mut zs_candidates, z1);

            placements.push(Placement::new(item.id(), rotation, x, y, z, dims));
            placed_volume += dims.volume();
            max_height = max_height.max(y + dims.height);
            max_depth = max_depth.max(z1);
        }

        max_height = max_height.max(grid.max_height());

        let utilization = placed_volume / container.volume();
        let placed_count = placements.len();
        let placed_fraction = if n == 0 {
            0.0
        } else {
            placed_count as f64 / n as f64
        };
        let fitness = utilization + self.weights.placed * placed_fraction
            - self.weights.height * (max_height / ch)
            - self.weights.depth * (max_depth / cd);

        DecoderResult {
            utilization,
            placed_count,
            max_height,
            max_depth,
            fitness,
            placements,
        }
    }
}

/// Adds a corner coordinate, keeping the list sorted and free of duplicates.
fn insert_candidate(list: &mut Vec<f64>, value: f64) {
    if let Err(pos) = list.binary_search_by(|v| v.total_cmp(&value)) {
        list.insert(pos, value);
    }
}
