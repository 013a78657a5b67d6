//! Key-vector layout for packing chromosomes.
//!
//! A chromosome for `n` items has `2n` keys: the first `n` order the items,
//! the last `n` pick each item's rotation.

use crate::orientation::{key_to_rotation, rotation_to_key};
use rkpack_core::random_key::{decode_permutation, encode_permutation};

/// Splits a key vector into a loading order and a per-item rotation plan.
///
/// `keys` must hold at least `2n` values.
pub fn decode_keys(keys: &[f64], n: usize) -> (Vec<usize>, Vec<u8>) {
    let order = decode_permutation(&keys[..n]);
    let plan = keys[n..2 * n].iter().map(|&k| key_to_rotation(k)).collect();
    (order, plan)
}

/// Builds the canonical key vector for an order and rotation plan.
///
/// The item at position `p` gets key `(p + 1) / (n + 1)`; rotations get the
/// midpoint of their bin.
pub fn reencode(order: &[usize], plan: &[u8]) -> Vec<f64> {
    let mut keys = encode_permutation(order);
    keys.extend(plan.iter().map(|&r| rotation_to_key(r)));
    keys
}
