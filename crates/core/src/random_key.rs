//! Random-key helpers.
//!
//! A random-key vector represents discrete decisions as reals in `[0, 1]`:
//! permutations are recovered by sorting keys, categorical choices by
//! binning a key into equal-width intervals.

use crate::rng::SeededRng;
use std::cmp::Ordering;

/// Upper clamp applied before binning so that a key of exactly `1.0`
/// still falls into the last bin.
pub const BIN_CLAMP_EPS: f64 = 1e-9;

/// Creates a uniformly random key vector of the given length.
pub fn random_keys(len: usize, rng: &mut SeededRng) -> Vec<f64> {
    (0..len).map(|_| rng.next_f64()).collect()
}

/// Decodes keys into a permutation of their indices.
///
/// Sorting is ascending by key value; equal keys keep their original
/// index order, so decoding is fully deterministic.
pub fn decode_permutation(keys: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..keys.len()).collect();
    indices.sort_by(|&a, &b| match keys[a].total_cmp(&keys[b]) {
        Ordering::Equal => a.cmp(&b),
        other => other,
    });
    indices
}

/// Maps a key to one of `options` equal-width bins, returning a zero-based
/// bin index.
pub fn decode_discrete(key: f64, options: usize) -> usize {
    if options == 0 {
        return 0;
    }
    let clamped = if key.is_nan() {
        0.0
    } else {
        key.clamp(0.0, 1.0 - BIN_CLAMP_EPS)
    };
    ((options as f64 * clamped).floor() as usize).min(options - 1)
}

/// Returns the midpoint key of a zero-based bin.
///
/// `decode_discrete(bin_midpoint(b, n), n) == b` for every `b < n`.
pub fn bin_midpoint(bin: usize, options: usize) -> f64 {
    if options == 0 {
        return 0.0;
    }
    let bin = bin.min(options - 1);
    (bin as f64 + 0.5) / options as f64
}

/// Encodes a permutation back into keys.
///
/// The element at position `p` receives key `(p + 1) / (n + 1)`, which keeps
/// every key strictly inside `(0, 1)` and distinct.
pub fn encode_permutation(order: &[usize]) -> Vec<f64> {
    let n = order.len();
    let mut keys = vec![0.0; n];
    let denom = (n + 1) as f64;
    for (pos, &idx) in order.iter().enumerate() {
        if idx < n {
            keys[idx] = (pos + 1) as f64 / denom;
        }
    }
    keys
}

/// Clamps every key into `[0, 1]`.
pub fn clamp_unit(keys: &mut [f64]) {
    for key in keys.iter_mut() {
        *key = if key.is_nan() { 0.0 } else { key.clamp(0.0, 1.0) };
    }
}
