//! Hill-climbing local search over permutation-plus-choice solutions.
//!
//! The move set mirrors the classic sequencing neighborhoods: swap,
//! relocate, short reversal and a categorical re-choice. Problems supply
//! how a move is applied; this module owns the acceptance loop.

use crate::result::Evaluation;
use crate::rng::SeededRng;

/// Minimum fitness gain for a candidate to count as an improvement.
pub const IMPROVEMENT_EPS: f64 = 1e-15;

/// Longest run a reversal move may flip.
pub const MAX_REVERSAL_LEN: usize = 12;

/// Neighborhood move types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NeighborhoodMove {
    /// Swap two positions of the sequence.
    Swap,
    /// Remove one element and reinsert it elsewhere.
    Relocate,
    /// Reverse a short contiguous run.
    Reverse,
    /// Change one element's categorical choice (e.g. rotation).
    Rotate,
}

impl NeighborhoodMove {
    /// All moves, in draw order.
    pub const ALL: [NeighborhoodMove; 4] = [
        NeighborhoodMove::Swap,
        NeighborhoodMove::Relocate,
        NeighborhoodMove::Reverse,
        NeighborhoodMove::Rotate,
    ];

    /// Draws a move uniformly at random.
    pub fn random(rng: &mut SeededRng) -> Self {
        Self::ALL[rng.next_index(0, Self::ALL.len())]
    }
}

/// Applies a move to a sequence in place. Returns `false` when the drawn
/// move turned out to be a no-op.
///
/// `Rotate` is not handled here since it does not touch the sequence.
pub fn apply_sequence_move<T>(
    sequence: &mut Vec<T>,
    mv: NeighborhoodMove,
    rng: &mut SeededRng,
) -> bool {
    let n = sequence.len();
    if n == 0 {
        return false;
    }

    match mv {
        NeighborhoodMove::Swap => {
            let i = rng.next_index(0, n);
            let j = rng.next_index(0, n);
            sequence.swap(i, j);
            i != j
        }
        NeighborhoodMove::Relocate => {
            let from = rng.next_index(0, n);
            let to = rng.next_index(0, n);
            if from == to {
                return false;
            }
            let value = sequence.remove(from);
            sequence.insert(to, value);
            true
        }
        NeighborhoodMove::Reverse => {
            let mut a = rng.next_index(0, n);
            let mut b = rng.next_index(0, n);
            if a > b {
                std::mem::swap(&mut a, &mut b);
            }
            let len = b - a + 1;
            if len >= 2 && len <= MAX_REVERSAL_LEN.min(n) {
                sequence[a..=b].reverse();
                true
            } else {
                false
            }
        }
        NeighborhoodMove::Rotate => false,
    }
}

/// Draws a choice in `1..=options` different from `current`.
///
/// With a single option there is nothing to change and `current` is returned.
pub fn redraw_choice(current: u8, options: u8, rng: &mut SeededRng) -> u8 {
    if options <= 1 {
        return current;
    }
    loop {
        let candidate = 1 + rng.next_index(0, options as usize) as u8;
        if candidate != current {
            return candidate;
        }
    }
}

/// Outcome of a hill-climbing call.
#[derive(Debug, Clone)]
pub struct LocalSearchOutcome<S> {
    /// Best solution found (the start solution if nothing improved).
    pub best: S,
    /// Evaluation of `best`.
    pub evaluation: Evaluation,
    /// Candidate evaluations spent.
    pub evaluations: u64,
    /// Number of accepted moves.
    pub accepted: usize,
}

impl<S> LocalSearchOutcome<S> {
    /// Whether at least one move was accepted.
    pub fn improved(&self) -> bool {
        self.accepted > 0
    }
}

/// Runs `moves` random neighborhood moves, each built on the best solution
/// so far, accepting strict improvements only.
pub fn hill_climb<S, N, E>(
    start: S,
    start_eval: Evaluation,
    moves: usize,
    rng: &mut SeededRng,
    mut neighbor: N,
    mut evaluate: E,
) -> LocalSearchOutcome<S>
where
    S: Clone,
    N: FnMut(&S, NeighborhoodMove, &mut SeededRng) -> S,
    E: FnMut(&S) -> Evaluation,
{
    let mut best = start;
    let mut best_eval = start_eval;
    let mut evaluations = 0u64;
    let mut accepted = 0usize;

    for _ in 0..moves {
        let mv = NeighborhoodMove::random(rng);
        let candidate = neighbor(&best, mv, rng);
        let eval = evaluate(&candidate);
        evaluations += 1;

        if eval.fitness > best_eval.fitness + IMPROVEMENT_EPS {
            best = candidate;
            best_eval = eval;
            accepted += 1;
        }
    }

    LocalSearchOutcome {
        best,
        evaluation: best_eval,
        evaluations,
        accepted,
    }
}
