//! Per-trial seed derivation.
//!
//! Each trial seeds its own `SmallRng` from `(base_seed, iteration, p_index)`
//! so results do not depend on the order in which trials are executed.

/// SplitMix64 increment (the 64-bit golden ratio).
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
const SPLITMIX_MULT_A: u64 = 0xBF58_476D_1CE4_E5B9;
const SPLITMIX_MULT_B: u64 = 0x94D0_49BB_1331_11EB;

#[inline]
const fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(GOLDEN_GAMMA);
    state = (state ^ (state >> 30)).wrapping_mul(SPLITMIX_MULT_A);
    state = (state ^ (state >> 27)).wrapping_mul(SPLITMIX_MULT_B);
    state ^ (state >> 31)
}

/// Derives the seed of trial `(iteration, p_index)` from the sweep seed.
///
/// The iteration and probability index are folded in one at a time, each
/// followed by a full SplitMix64 round, so neighbouring trials get unrelated
/// seeds.
#[must_use]
pub fn trial_seed(base_seed: u64, iteration: usize, p_index: usize) -> u64 {
    let with_iteration = splitmix64(base_seed ^ (iteration as u64).wrapping_mul(GOLDEN_GAMMA));
    splitmix64(with_iteration ^ (p_index as u64 + 1).wrapping_mul(SPLITMIX_MULT_A))
}
