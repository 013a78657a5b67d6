//! Random-key differential evolution.
//!
//! One engine drives every search variant:
//!
//! - `H0`: evaluates the problem's baseline vector once, then samples random
//!   key vectors, keeping the strictly best.
//! - `A1`: DE/rand/1/bin with fixed F and CR.
//! - `A2`: self-adaptive DE/current-to-pbest/1/bin with stagnation restart.
//! - `A3`: `A2` plus hill climbing on the elite after every sweep.
//!
//! All randomness comes from one [`SeededRng`] drawn in a fixed order, so a
//! seed and a generation cap fully determine a run.

use crate::local_search::{LocalSearchOutcome, IMPROVEMENT_EPS};
use crate::random_key::{clamp_unit, random_keys};
use crate::result::Evaluation;
use crate::rng::SeededRng;
use crate::solver::{Config, ProgressCallback, ProgressInfo, Variant};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A problem that can be searched with random-key DE.
pub trait DeProblem: Send + Sync {
    /// Length of every key vector.
    fn num_keys(&self) -> usize;

    /// Decodes and scores a key vector. Must be deterministic.
    fn evaluate(&self, keys: &[f64]) -> Evaluation;

    /// Hand-built starting vector evaluated first by the `H0` baseline.
    ///
    /// When `None`, `H0` starts from a random vector instead.
    fn baseline_keys(&self) -> Option<Vec<f64>> {
        None
    }

    /// Improves a key vector by neighborhood moves.
    ///
    /// The default performs no moves.
    fn local_search(
        &self,
        keys: &[f64],
        current: Evaluation,
        _moves: usize,
        _rng: &mut SeededRng,
    ) -> LocalSearchOutcome<Vec<f64>> {
        LocalSearchOutcome {
            best: keys.to_vec(),
            evaluation: current,
            evaluations: 0,
            accepted: 0,
        }
    }

    /// Called after each generation.
    fn on_generation(&self, _generation: u32, _best_keys: &[f64], _best: Evaluation) {
        // Default: do nothing
    }
}

/// One individual of the population.
#[derive(Debug, Clone)]
pub struct Member {
    /// Key vector, every coordinate in `[0, 1]`.
    pub keys: Vec<f64>,
    /// Cached evaluation of `keys`.
    pub evaluation: Evaluation,
    /// Mutation factor (self-adaptive variants).
    pub f: f64,
    /// Crossover rate (self-adaptive variants).
    pub cr: f64,
}

impl Member {
    /// Returns the cached fitness.
    #[inline]
    pub fn fitness(&self) -> f64 {
        self.evaluation.fitness
    }
}

/// Result of a DE run.
#[derive(Debug, Clone)]
pub struct DeResult {
    /// Variant that ran.
    pub variant: Variant,
    /// Seed of the run.
    pub seed: u64,
    /// Keys of the best individual found.
    pub best_keys: Vec<f64>,
    /// Evaluation of `best_keys`.
    pub best: Evaluation,
    /// Completed generations (0 for `H0`).
    pub generations: u32,
    /// Decoder evaluations performed.
    pub evaluations: u64,
    /// Stagnation restarts triggered.
    pub restarts: u32,
    /// Total elapsed time.
    pub elapsed: Duration,
    /// Best fitness at the start and after each generation.
    ///
    /// For `H0` one entry per improvement of the incumbent.
    pub history: Vec<f64>,
}

/// Differential evolution runner.
pub struct DeRunner<P: DeProblem> {
    config: Config,
    problem: P,
    cancelled: Arc<AtomicBool>,
}

/// Mutable state of one run.
struct RunState {
    rng: SeededRng,
    start: Instant,
    evaluations: u64,
    generations: u32,
    history: Vec<f64>,
    best_keys: Vec<f64>,
    best: Evaluation,
}

impl RunState {
    fn improve_to(&mut self, keys: &[f64], evaluation: Evaluation) {
        self.best_keys.clear();
        self.best_keys.extend_from_slice(keys);
        self.best = evaluation;
    }
}

impl<P: DeProblem> DeRunner<P> {
    /// Creates a new runner.
    pub fn new(config: Config, problem: P) -> Self {
        Self {
            config,
            problem,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates a runner sharing an external cancellation flag.
    pub fn with_cancellation(config: Config, problem: P, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            config,
            problem,
            cancelled,
        }
    }

    /// Returns a handle to cancel the run between generations.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Returns the problem being solved.
    pub fn problem(&self) -> &P {
        &self.problem
    }

    /// Runs the configured variant.
    pub fn run(&self) -> DeResult {
        self.execute(None)
    }

    /// Runs the configured variant, reporting progress once per generation.
    pub fn run_with_progress(&self, callback: &ProgressCallback) -> DeResult {
        self.execute(Some(callback))
    }

    fn execute(&self, callback: Option<&ProgressCallback>) -> DeResult {
        let mut state = RunState {
            rng: SeededRng::new(self.config.seed),
            start: Instant::now(),
            evaluations: 0,
            generations: 0,
            history: Vec::new(),
            best_keys: Vec::new(),
            best: Evaluation::EMPTY,
        };

        let mut restarts = 0;
        match self.config.variant {
            Variant::H0 => self.run_sampling(&mut state),
            Variant::A1 => self.run_classic(&mut state, callback),
            Variant::A2 | Variant::A3 => {
                restarts = self.run_adaptive(&mut state, callback);
            }
        }

        let elapsed = state.start.elapsed();
        if let Some(cb) = callback {
            cb(ProgressInfo {
                generation: state.generations,
                best_fitness: state.best.fitness,
                avg_fitness: state.best.fitness,
                elapsed_ms: elapsed.as_millis() as u64,
                running: false,
            });
        }

        log::info!(
            "{} finished: best fitness {:.6}, utilization {:.4}, {} generations, {} evaluations in {:.2?}",
            self.config.variant,
            state.best.fitness,
            state.best.utilization,
            state.generations,
            state.evaluations,
            elapsed
        );

        DeResult {
            variant: self.config.variant,
            seed: self.config.seed,
            best_keys: state.best_keys,
            best: state.best,
            generations: state.generations,
            evaluations: state.evaluations,
            restarts,
            elapsed,
            history: state.history,
        }
    }

    fn out_of_time(&self, start: Instant) -> bool {
        self.cancelled.load(Ordering::Relaxed) || start.elapsed() >= self.config.time_limit()
    }

    fn generation_cap(&self) -> u32 {
        self.config.max_generations.unwrap_or(u32::MAX)
    }

    fn evaluate(&self, keys: &[f64], state: &mut RunState) -> Evaluation {
        state.evaluations += 1;
        self.problem.evaluate(keys)
    }

    /// H0: baseline, then uniform random sampling.
    fn run_sampling(&self, state: &mut RunState) {
        let dim = self.problem.num_keys();
        let baseline = self
            .problem
            .baseline_keys()
            .unwrap_or_else(|| random_keys(dim, &mut state.rng));
        let eval = self.evaluate(&baseline, state);
        state.improve_to(&baseline, eval);
        state.history.push(eval.fitness);

        // The cap bounds the number of samples; no generations are reported.
        let cap = u64::from(self.generation_cap());
        let mut samples = 0u64;
        while !self.out_of_time(state.start) && samples < cap {
            let keys = random_keys(dim, &mut state.rng);
            let eval = self.evaluate(&keys, state);
            samples += 1;
            if eval.fitness > state.best.fitness {
                state.improve_to(&keys, eval);
                state.history.push(eval.fitness);
            }
        }

        log::debug!("H0 drew {} samples", samples);
    }

    fn initialize(&self, state: &mut RunState) -> Vec<Member> {
        let np = self.config.effective_population();
        let dim = self.problem.num_keys();
        let (fl, fu) = (self.config.f_lower, self.config.f_upper);

        let mut population = Vec::with_capacity(np);
        for _ in 0..np {
            population.push(self.fresh_member(dim, fl, fu, state));
        }

        let best_idx = argmax(&population);
        let best = population[best_idx].clone();
        state.improve_to(&best.keys, best.evaluation);
        state.history.push(best.fitness());
        population
    }

    fn fresh_member(&self, dim: usize, fl: f64, fu: f64, state: &mut RunState) -> Member {
        let keys = random_keys(dim, &mut state.rng);
        let (f, cr) = if self.config.variant.is_self_adaptive() {
            let f = state.rng.next_in_range(fl, fu);
            let cr = state.rng.next_f64();
            (f, cr)
        } else {
            (self.config.fixed_f, self.config.fixed_cr)
        };
        let evaluation = self.evaluate(&keys, state);
        Member {
            keys,
            evaluation,
            f,
            cr,
        }
    }

    /// A1: DE/rand/1/bin.
    fn run_classic(&self, state: &mut RunState, callback: Option<&ProgressCallback>) {
        let mut population = self.initialize(state);
        let np = population.len();
        let (f, cr) = (self.config.fixed_f, self.config.fixed_cr);

        while !self.out_of_time(state.start) && state.generations < self.generation_cap() {
            state.generations += 1;

            for i in 0..np {
                let r0 = draw_distinct(&mut state.rng, np, &[i]);
                let r1 = draw_distinct(&mut state.rng, np, &[i, r0]);
                let r2 = draw_distinct(&mut state.rng, np, &[i, r0, r1]);

                let mutant: Vec<f64> = population[r0]
                    .keys
                    .iter()
                    .zip(&population[r1].keys)
                    .zip(&population[r2].keys)
                    .map(|((a, b), c)| a + f * (b - c))
                    .collect();

                let mut trial = binomial_crossover(&mut state.rng, &population[i].keys, &mutant, cr);
                clamp_unit(&mut trial);

                let eval = self.evaluate(&trial, state);
                if eval.fitness >= population[i].fitness() {
                    if eval.fitness > state.best.fitness {
                        state.improve_to(&trial, eval);
                    }
                    population[i].keys = trial;
                    population[i].evaluation = eval;
                }
            }

            self.finish_generation(state, &population, callback);
        }
    }

    /// A2/A3: self-adaptive current-to-pbest/1/bin, optional local search and
    /// stagnation restart. Returns the number of restarts.
    fn run_adaptive(&self, state: &mut RunState, callback: Option<&ProgressCallback>) -> u32 {
        let mut population = self.initialize(state);
        let np = population.len();
        let dim = self.problem.num_keys();
        let config = &self.config;
        let elite_count = config.elite_count();
        let use_local_search = config.variant.uses_local_search();

        let mut stagnant = 0u32;
        let mut restarts = 0u32;

        while !self.out_of_time(state.start) && state.generations < self.generation_cap() {
            state.generations += 1;

            let ranking = rank_descending(&population);
            let elite = &ranking[..elite_count];

            for i in 0..np {
                if state.rng.chance(config.tau1) {
                    population[i].f = state.rng.next_in_range(config.f_lower, config.f_upper);
                }
                if state.rng.chance(config.tau2) {
                    population[i].cr = state.rng.next_f64();
                }

                let pbest = elite[state.rng.next_index(0, elite.len())];
                let r1 = draw_distinct(&mut state.rng, np, &[i, pbest]);
                let r2 = draw_distinct(&mut state.rng, np, &[i, pbest, r1]);

                let member = &population[i];
                let f = member.f;
                let mutant: Vec<f64> = (0..dim)
                    .map(|j| {
                        let x = member.keys[j];
                        x + f * (population[pbest].keys[j] - x)
                            + f * (population[r1].keys[j] - population[r2].keys[j])
                    })
                    .collect();

                let mut trial = binomial_crossover(&mut state.rng, &member.keys, &mutant, member.cr);
                clamp_unit(&mut trial);

                let eval = self.evaluate(&trial, state);
                if eval.fitness >= population[i].fitness() {
                    population[i].keys = trial;
                    population[i].evaluation = eval;
                }
            }

            if use_local_search && !self.out_of_time(state.start) {
                let ranking = rank_descending(&population);
                for &idx in &ranking[..config.local_search_count()] {
                    if self.out_of_time(state.start) {
                        break;
                    }
                    let outcome = self.problem.local_search(
                        &population[idx].keys,
                        population[idx].evaluation,
                        config.local_search_moves,
                        &mut state.rng,
                    );
                    state.evaluations += outcome.evaluations;
                    if outcome.improved() {
                        population[idx].keys = outcome.best;
                        population[idx].evaluation = outcome.evaluation;
                    }
                }
            }

            let current = argmax(&population);
            if population[current].fitness() > state.best.fitness + IMPROVEMENT_EPS {
                let winner = population[current].clone();
                state.improve_to(&winner.keys, winner.evaluation);
                stagnant = 0;
            } else {
                stagnant += 1;
            }

            if stagnant >= config.stagnation_generations && config.restart_worst_fraction > 0.0 {
                let ranking = rank_descending(&population);
                let worst: Vec<usize> = ranking.iter().rev().take(config.restart_count()).copied().collect();
                for idx in worst {
                    population[idx] = self.fresh_member(dim, config.f_lower, config.f_upper, state);
                }
                stagnant = 0;
                restarts += 1;
                log::debug!(
                    "restart at generation {}: reinitialized {} individuals",
                    state.generations,
                    config.restart_count()
                );
            }

            self.finish_generation(state, &population, callback);
        }

        restarts
    }

    fn finish_generation(
        &self,
        state: &mut RunState,
        population: &[Member],
        callback: Option<&ProgressCallback>,
    ) {
        state.history.push(state.best.fitness);
        self.problem
            .on_generation(state.generations, &state.best_keys, state.best);

        let avg_fitness =
            population.iter().map(Member::fitness).sum::<f64>() / population.len().max(1) as f64;
        log::debug!(
            "generation {}: best {:.6}, avg {:.6}, evals {}",
            state.generations,
            state.best.fitness,
            avg_fitness,
            state.evaluations
        );

        if let Some(cb) = callback {
            cb(ProgressInfo {
                generation: state.generations,
                best_fitness: state.best.fitness,
                avg_fitness,
                elapsed_ms: state.start.elapsed().as_millis() as u64,
                running: true,
            });
        }
    }
}

/// Draws an index in `0..n` not contained in `exclude`.
fn draw_distinct(rng: &mut SeededRng, n: usize, exclude: &[usize]) -> usize {
    loop {
        let candidate = rng.next_index(0, n);
        if !exclude.contains(&candidate) {
            return candidate;
        }
    }
}

/// Binomial crossover with one forced mutant coordinate.
fn binomial_crossover(rng: &mut SeededRng, target: &[f64], mutant: &[f64], cr: f64) -> Vec<f64> {
    let dim = target.len();
    if dim == 0 {
        return Vec::new();
    }
    let jrand = rng.next_index(0, dim);
    (0..dim)
        .map(|j| {
            if rng.next_f64() < cr || j == jrand {
                mutant[j]
            } else {
                target[j]
            }
        })
        .collect()
}

/// Index of the fittest member; the first one wins ties.
fn argmax(population: &[Member]) -> usize {
    let mut best = 0;
    for (i, member) in population.iter().enumerate().skip(1) {
        if member.fitness() > population[best].fitness() {
            best = i;
        }
    }
    best
}

/// Member indices by descending fitness, ties by index. NaN ranks last.
fn rank_descending(population: &[Member]) -> Vec<usize> {
    let rank_key = |i: usize| {
        let fitness = population[i].fitness();
        if fitness.is_nan() {
            f64::NEG_INFINITY
        } else {
            fitness
        }
    };
    let mut indices: Vec<usize> = (0..population.len()).collect();
    indices.sort_by(|&a, &b| rank_key(b).total_cmp(&rank_key(a)));
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_search::{apply_sequence_move, hill_climb};
    use crate::random_key::{decode_permutation, encode_permutation};

    /// Maximizes the number of keys above one half.
    struct OneMax {
        len: usize,
    }

    impl DeProblem for OneMax {
        fn num_keys(&self) -> usize {
            self.len
        }

        fn evaluate(&self, keys: &[f64]) -> Evaluation {
            let hits = keys.iter().filter(|&&k| k > 0.5).count();
            Evaluation::new(hits as f64 / self.len as f64, 0.0, hits)
        }
    }

    /// Sequencing problem: the decoded permutation should be sorted.
    struct SortPermutation {
        len: usize,
    }

    impl SortPermutation {
        fn score(order: &[usize]) -> Evaluation {
            let hits = order.iter().enumerate().filter(|(i, &v)| *i == v).count();
            Evaluation::new(hits as f64, 0.0, hits)
        }
    }

    impl DeProblem for SortPermutation {
        fn num_keys(&self) -> usize {
            self.len
        }

        fn evaluate(&self, keys: &[f64]) -> Evaluation {
            Self::score(&decode_permutation(keys))
        }

        fn baseline_keys(&self) -> Option<Vec<f64>> {
            let reversed: Vec<usize> = (0..self.len).rev().collect();
            Some(encode_permutation(&reversed))
        }

        fn local_search(
            &self,
            keys: &[f64],
            current: Evaluation,
            moves: usize,
            rng: &mut SeededRng,
        ) -> LocalSearchOutcome<Vec<f64>> {
            let outcome = hill_climb(
                decode_permutation(keys),
                current,
                moves,
                rng,
                |order, mv, rng| {
                    let mut next = order.clone();
                    apply_sequence_move(&mut next, mv, rng);
                    next
                },
                |order| Self::score(order),
            );
            LocalSearchOutcome {
                best: encode_permutation(&outcome.best),
                evaluation: outcome.evaluation,
                evaluations: outcome.evaluations,
                accepted: outcome.accepted,
            }
        }
    }

    fn capped(variant: Variant, generations: u32) -> Config {
        Config::default()
            .with_variant(variant)
            .with_seed(7)
            .with_population_size(20)
            .with_time_limit(60.0)
            .with_max_generations(generations)
    }

    #[test]
    fn test_de_variants_improve_onemax() {
        for variant in [Variant::A1, Variant::A2, Variant::A3] {
            let runner = DeRunner::new(capped(variant, 60), OneMax { len: 30 });
            let result = runner.run();

            assert_eq!(result.generations, 60);
            assert_eq!(result.history.len(), 61);
            assert!(result.best.fitness >= result.history[0]);
            assert!(result.best.fitness > 0.7, "{variant}: {}", result.best.fitness);
        }
    }

    #[test]
    fn test_history_is_monotone() {
        for variant in [Variant::A1, Variant::A2, Variant::A3] {
            let runner = DeRunner::new(capped(variant, 40), SortPermutation { len: 12 });
            let result = runner.run();
            for pair in result.history.windows(2) {
                assert!(pair[1] >= pair[0], "{variant} history decreased");
            }
            assert_eq!(*result.history.last().unwrap(), result.best.fitness);
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        for variant in Variant::ALL {
            let a = DeRunner::new(capped(variant, 15), SortPermutation { len: 10 }).run();
            let b = DeRunner::new(capped(variant, 15), SortPermutation { len: 10 }).run();

            assert_eq!(a.best_keys, b.best_keys);
            assert_eq!(a.best, b.best);
            assert_eq!(a.evaluations, b.evaluations);
            assert_eq!(a.history, b.history);
        }
    }

    #[test]
    fn test_best_keys_match_best_evaluation() {
        for variant in Variant::ALL {
            let problem = SortPermutation { len: 9 };
            let result = DeRunner::new(capped(variant, 10), SortPermutation { len: 9 }).run();
            assert_eq!(problem.evaluate(&result.best_keys), result.best);
        }
    }

    #[test]
    fn test_evaluation_counts() {
        let np = 20u64;

        let a1 = DeRunner::new(capped(Variant::A1, 5), OneMax { len: 8 }).run();
        assert_eq!(a1.evaluations, np + 5 * np);

        let a2 = DeRunner::new(
            capped(Variant::A2, 5).with_restart(1000, 0.2),
            OneMax { len: 8 },
        )
        .run();
        assert_eq!(a2.evaluations, np + 5 * np);
        assert_eq!(a2.restarts, 0);

        let h0 = DeRunner::new(capped(Variant::H0, 25), OneMax { len: 8 }).run();
        assert_eq!(h0.evaluations, 1 + 25);
        assert_eq!(h0.generations, 0);
    }

    #[test]
    fn test_local_search_counts_candidates() {
        // ceil(0.1 * 20) = 2 individuals, 5 moves each, per generation.
        let config = capped(Variant::A3, 3)
            .with_local_search(5, 0.1)
            .with_restart(1000, 0.2);
        let result = DeRunner::new(config, SortPermutation { len: 10 }).run();
        assert_eq!(result.evaluations, 20 + 3 * 20 + 3 * 2 * 5);
    }

    #[test]
    fn test_restart_triggers_on_stagnation() {
        // OneMax with a single key saturates immediately, so every
        // generation after the first is stagnant.
        let config = capped(Variant::A2, 6).with_restart(2, 0.2);
        let result = DeRunner::new(config, OneMax { len: 1 }).run();
        assert!(result.restarts >= 1);
        assert_eq!(
            result.evaluations,
            20 + 6 * 20 + u64::from(result.restarts) * 4
        );
    }

    #[test]
    fn test_h0_never_below_baseline() {
        let problem = SortPermutation { len: 8 };
        let baseline = problem.evaluate(&problem.baseline_keys().unwrap());

        let result = DeRunner::new(capped(Variant::H0, 50), SortPermutation { len: 8 }).run();
        assert!(result.best.fitness >= baseline.fitness);
        assert!(result.evaluations >= 1);
        assert_eq!(result.history[0], baseline.fitness);
    }

    #[test]
    fn test_zero_time_limit() {
        let config = Config::default()
            .with_variant(Variant::A2)
            .with_population_size(10)
            .with_time_limit(0.0);
        let result = DeRunner::new(config, OneMax { len: 4 }).run();
        assert_eq!(result.generations, 0);
        assert_eq!(result.evaluations, 10);
    }

    #[test]
    fn test_cancel_handle_stops_run() {
        let runner = DeRunner::new(
            Config::default().with_variant(Variant::A1).with_time_limit(3600.0),
            OneMax { len: 4 },
        );
        runner.cancel_handle().store(true, Ordering::Relaxed);
        let result = runner.run();
        assert_eq!(result.generations, 0);
    }

    #[test]
    fn test_progress_callback() {
        use std::sync::atomic::AtomicU32;

        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let callback: ProgressCallback = Box::new(move |info| {
            if info.running {
                seen.fetch_add(1, Ordering::Relaxed);
            }
        });

        let runner = DeRunner::new(capped(Variant::A1, 4), OneMax { len: 6 });
        runner.run_with_progress(&callback);
        assert_eq!(calls.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_crossover_forces_one_mutant_coordinate() {
        let mut rng = SeededRng::new(4);
        let target = vec![0.0; 16];
        let mutant = vec![1.0; 16];
        for _ in 0..50 {
            let trial = binomial_crossover(&mut rng, &target, &mutant, 0.0);
            assert_eq!(trial.iter().filter(|&&x| x == 1.0).count(), 1);
        }
        assert!(binomial_crossover(&mut rng, &[], &[], 0.5).is_empty());
    }

    #[test]
    fn test_rank_descending_ties_by_index() {
        let member = |fitness| Member {
            keys: Vec::new(),
            evaluation: Evaluation::new(fitness, 0.0, 0),
            f: 0.5,
            cr: 0.5,
        };
        let population = vec![member(1.0), member(3.0), member(1.0), member(2.0)];
        assert_eq!(rank_descending(&population), vec![1, 3, 0, 2]);
        assert_eq!(argmax(&population), 1);
    }

    #[test]
    fn test_rank_descending_is_total_with_nan() {
        let member = |fitness| Member {
            keys: Vec::new(),
            evaluation: Evaluation::new(fitness, 0.0, 0),
            f: 0.5,
            cr: 0.5,
        };
        let population = vec![
            member(f64::NAN),
            member(0.5),
            member(f64::NEG_INFINITY),
            member(2.0),
            member(f64::NAN),
            member(0.5),
        ];
        assert_eq!(rank_descending(&population), vec![3, 1, 5, 0, 2, 4]);
    }
}
