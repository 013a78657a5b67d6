//! Integration tests for rkpack-core.

use approx::assert_relative_eq;
use rkpack_core::de::{DeProblem, DeRunner};
use rkpack_core::random_key::{decode_discrete, decode_permutation, encode_permutation};
use rkpack_core::result::{Evaluation, SolveResult};
use rkpack_core::solver::{Config, Variant};

/// Weighted completion-time style problem over a permutation plus a
/// two-way choice per element.
struct WeightedSequence {
    weights: Vec<f64>,
}

impl WeightedSequence {
    fn score(&self, order: &[usize], choices: &[usize]) -> f64 {
        let positional: f64 = order
            .iter()
            .enumerate()
            .map(|(pos, &idx)| self.weights[idx] * (order.len() - pos) as f64)
            .sum();
        let bonus = choices.iter().filter(|&&c| c == 1).count() as f64;
        positional + bonus
    }
}

impl DeProblem for WeightedSequence {
    fn num_keys(&self) -> usize {
        2 * self.weights.len()
    }

    fn evaluate(&self, keys: &[f64]) -> Evaluation {
        let n = self.weights.len();
        let order = decode_permutation(&keys[..n]);
        let choices: Vec<usize> = keys[n..].iter().map(|&k| decode_discrete(k, 2)).collect();
        let placed = choices.iter().filter(|&&c| c == 1).count();
        Evaluation::new(self.score(&order, &choices), 0.0, placed)
    }
}

fn problem() -> WeightedSequence {
    WeightedSequence {
        weights: vec![5.0, 1.0, 4.0, 2.0, 3.0, 0.5, 6.0, 2.5],
    }
}

fn optimum(p: &WeightedSequence) -> f64 {
    let mut order: Vec<usize> = (0..p.weights.len()).collect();
    order.sort_by(|&a, &b| p.weights[b].partial_cmp(&p.weights[a]).unwrap());
    p.score(&order, &vec![1; p.weights.len()])
}

mod de_tests {
    use super::*;

    #[test]
    fn test_adaptive_variants_approach_optimum() {
        let target = optimum(&problem());
        for variant in [Variant::A2, Variant::A3] {
            let config = Config::default()
                .with_variant(variant)
                .with_seed(11)
                .with_population_size(30)
                .with_time_limit(60.0)
                .with_max_generations(300);
            let result = DeRunner::new(config, problem()).run();
            // A handful of adjacent inversions away from the best ordering at most.
            assert!(result.best.fitness >= target - 3.0, "{variant}: {}", result.best.fitness);
            assert!(result.best.fitness <= target + 1e-9);
        }
    }

    #[test]
    fn test_variants_stay_below_optimum() {
        for variant in Variant::ALL {
            let config = Config::default()
                .with_variant(variant)
                .with_seed(3)
                .with_population_size(10)
                .with_time_limit(60.0)
                .with_max_generations(30);
            let result = DeRunner::new(config, problem()).run();
            assert!(result.best.fitness <= optimum(&problem()) + 1e-9);
            assert!(result.history.windows(2).all(|w| w[1] >= w[0]));
            assert_eq!(result.variant, variant);
            assert_eq!(result.seed, 3);
        }
    }

    #[test]
    fn test_different_seeds_explore_differently() {
        let run = |seed| {
            let config = Config::default()
                .with_variant(Variant::A1)
                .with_seed(seed)
                .with_population_size(10)
                .with_time_limit(60.0)
                .with_max_generations(2);
            DeRunner::new(config, problem()).run()
        };
        assert_ne!(run(1).best_keys, run(2).best_keys);
    }
}

mod random_key_tests {
    use super::*;

    #[test]
    fn test_encode_decode_any_permutation() {
        let order = vec![7, 2, 5, 0, 6, 1, 4, 3];
        assert_eq!(decode_permutation(&encode_permutation(&order)), order);
    }
}

mod result_tests {
    use super::*;

    #[test]
    fn test_solve_result_throughput() {
        let mut result: SolveResult<()> = SolveResult::new(Variant::A3, 1);
        result.evaluation_count = 500;
        result.elapsed_seconds = 2.0;
        assert_relative_eq!(result.evaluations_per_second(), 250.0);
    }
}
