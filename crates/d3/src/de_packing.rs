//! Differential evolution over packing chromosomes.
//!
//! Each chromosome holds `2n` random keys:
//! - Keys `[0..n)`: loading order (sorted indices)
//! - Keys `[n..2n)`: rotation indices (six equal bins)
//!
//! Decoding goes through the height-field decoder, and local search works
//! directly on the decoded (order, rotation plan) pair.

use crate::decoder::{DecoderResult, HeightmapDecoder};
use crate::encoding::{decode_keys, reencode};
use crate::instance::Instance;
use crate::orientation::ROTATION_COUNT;
use crate::placement::Placement;
use rkpack_core::de::{DeProblem, DeRunner};
use rkpack_core::local_search::{
    apply_sequence_move, hill_climb, redraw_choice, LocalSearchOutcome, NeighborhoodMove,
};
use rkpack_core::result::{Evaluation, SolveResult};
use rkpack_core::rng::SeededRng;
use rkpack_core::solver::{Config, ProgressCallback};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// DE problem definition for 3D container loading.
pub struct DePackingProblem<'a> {
    instance: &'a Instance,
    decoder: HeightmapDecoder,
}

impl<'a> DePackingProblem<'a> {
    /// Creates a new packing problem.
    pub fn new(instance: &'a Instance, decoder: HeightmapDecoder) -> Self {
        Self { instance, decoder }
    }

    /// Returns the number of items.
    pub fn num_items(&self) -> usize {
        self.instance.len()
    }

    /// Decodes a chromosome into a full layout.
    pub fn decode(&self, keys: &[f64]) -> DecoderResult {
        let (order, plan) = decode_keys(keys, self.num_items());
        self.decoder.evaluate(self.instance, &order, &plan)
    }

    /// Items by descending volume (ties by index), all in rotation 1.
    pub fn volume_descending_plan(&self) -> (Vec<usize>, Vec<u8>) {
        let items = self.instance.items();
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| items[b].volume().total_cmp(&items[a].volume()));
        (order, vec![1; items.len()])
    }

    fn neighbor(
        &self,
        solution: &(Vec<usize>, Vec<u8>),
        mv: NeighborhoodMove,
        rng: &mut SeededRng,
    ) -> (Vec<usize>, Vec<u8>) {
        let (mut order, mut plan) = solution.clone();
        match mv {
            NeighborhoodMove::Rotate => {
                if !plan.is_empty() {
                    let k = rng.next_index(0, plan.len());
                    plan[k] = redraw_choice(plan[k], ROTATION_COUNT, rng);
                }
            }
            _ => {
                apply_sequence_move(&mut order, mv, rng);
            }
        }
        (order, plan)
    }
}

impl DeProblem for DePackingProblem<'_> {
    fn num_keys(&self) -> usize {
        // N keys for order + N keys for rotations
        self.num_items() * 2
    }

    fn evaluate(&self, keys: &[f64]) -> Evaluation {
        self.decode(keys).evaluation()
    }

    fn baseline_keys(&self) -> Option<Vec<f64>> {
        let (order, plan) = self.volume_descending_plan();
        Some(reencode(&order, &plan))
    }

    fn local_search(
        &self,
        keys: &[f64],
        current: Evaluation,
        moves: usize,
        rng: &mut SeededRng,
    ) -> LocalSearchOutcome<Vec<f64>> {
        let start = decode_keys(keys, self.num_items());
        let outcome = hill_climb(
            start,
            current,
            moves,
            rng,
            |solution, mv, rng| self.neighbor(solution, mv, rng),
            |(order, plan)| self.decoder.evaluate(self.instance, order, plan).evaluation(),
        );

        let best = if outcome.improved() {
            reencode(&outcome.best.0, &outcome.best.1)
        } else {
            keys.to_vec()
        };
        LocalSearchOutcome {
            best,
            evaluation: outcome.evaluation,
            evaluations: outcome.evaluations,
            accepted: outcome.accepted,
        }
    }

    fn on_generation(&self, generation: u32, _best_keys: &[f64], best: Evaluation) {
        log::trace!(
            "3D packing gen {}: placed={}/{} V={:.4}",
            generation,
            best.placed_count,
            self.num_items(),
            best.utilization
        );
    }
}

/// Runs DE-based container loading on a validated, non-empty instance.
pub fn run_de_packing(
    instance: &Instance,
    config: &Config,
    decoder: &HeightmapDecoder,
    cancelled: Arc<AtomicBool>,
    callback: Option<&ProgressCallback>,
) -> SolveResult<Placement> {
    let problem = DePackingProblem::new(instance, decoder.clone());
    let runner = DeRunner::with_cancellation(config.clone(), problem, cancelled);

    let de_result = match callback {
        Some(cb) => runner.run_with_progress(cb),
        None => runner.run(),
    };

    // Re-decode the best chromosome for its layout
    let layout = runner.problem().decode(&de_result.best_keys);

    let mut result = SolveResult::new(de_result.variant, de_result.seed)
        .with_best(de_result.best)
        .with_placements(layout.placements);
    result.elapsed_seconds = de_result.elapsed.as_secs_f64();
    result.generation_count = de_result.generations;
    result.evaluation_count = de_result.evaluations;
    result.restarts = de_result.restarts;
    result.fitness_history = de_result.history;
    result
}
