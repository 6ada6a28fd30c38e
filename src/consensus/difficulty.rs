//! Difficulty adjustment algorithm
//!
//! LWMA (linearly weighted moving average) retargeting: every block looks
//! back over a window of solve times, weights recent ones more heavily and
//! nudges the average target of the window by at most 25%.
//!
//! The fixed-point scale and the order of operations below are consensus
//! rules. Two implementations that round differently accept different
//! chains.

use log::debug;

use super::block::BlockHeader;
use super::params::ConsensusParams;
use super::target::{compact_to_target, decode_compact, target_to_compact, U256};

/// Fixed-point scale of the adjustment factor
pub const LWMA_SCALE: u64 = 1_000_000;

/// Largest adjustment (target shrinks by 1/1.25)
const MAX_ADJUSTMENT: f64 = 1.25;

/// Smallest adjustment (target grows by 1/0.75)
const MIN_ADJUSTMENT: f64 = 0.75;

/// Solve times are clamped to this many target spacings either way
const SOLVETIME_CLAMP_SPACINGS: i64 = 6;

/// Read-only view of one accepted header, as handed in by chain state.
///
/// The retarget only ever reads height, time and bits; chain state owns
/// the full index and passes a height-ordered slice of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockIndex {
    pub height: u32,
    pub time: u32,
    pub bits: u32,
}

impl BlockIndex {
    pub fn new(height: u32, time: u32, bits: u32) -> Self {
        Self { height, time, bits }
    }

    pub fn from_header(height: u32, header: &BlockHeader) -> Self {
        Self::new(height, header.time, header.bits)
    }

    pub fn block_time(&self) -> i64 {
        i64::from(self.time)
    }
}

/// Calculate the compact target required of the block after `history`.
///
/// `history` is a height-ordered snapshot ending at the current tip. Only
/// the last `window + 1` entries are read; callers may pass more.
pub fn next_work_required(
    history: &[BlockIndex],
    candidate: &BlockHeader,
    params: &ConsensusParams,
) -> u32 {
    let pow_limit_bits = params.pow_limit_bits();
    let window = params.lwma_averaging_window.max(1);

    let Some(tip) = history.last() else {
        debug!("no chain history, using proof-of-work limit");
        return pow_limit_bits;
    };

    // bootstrap: not enough blocks for a meaningful average
    if tip.height < window {
        return pow_limit_bits;
    }

    if params.pow_no_retargeting {
        return tip.bits;
    }

    if params.pow_allow_min_difficulty_blocks
        && candidate.block_time() > tip.block_time() + params.pow_target_spacing * 2
    {
        debug!(
            "block time gap after height {} exceeds twice the spacing, allowing min difficulty",
            tip.height
        );
        return pow_limit_bits;
    }

    // tip first, then its ancestors
    let recent: Vec<&BlockIndex> = history.iter().rev().take(window as usize + 1).collect();
    if recent.len() < window as usize + 1 {
        debug!(
            "only {} ancestors supplied for a window of {}, using proof-of-work limit",
            recent.len(),
            window
        );
        return pow_limit_bits;
    }

    target_to_compact(&lwma_target(&recent, window, params))
}

/// Weighted retarget over `recent` (tip first, exactly `window + 1` long).
///
/// Target sums and the scaled product are taken modulo 2^256, and the
/// adjustment factor goes through `f64` before it is truncated to the
/// fixed-point scale. Both are what deployed nodes compute.
fn lwma_target(recent: &[&BlockIndex], window: u32, params: &ConsensusParams) -> U256 {
    let spacing = params.pow_target_spacing;
    let max_solvetime = SOLVETIME_CLAMP_SPACINGS * spacing;
    let min_solvetime = -max_solvetime;

    let mut weighted_solvetimes: i64 = 0;
    let mut weights_sum: i64 = 0;
    let mut sum_target = U256::zero();

    for i in 1..=window as usize {
        let solvetime = (recent[i - 1].block_time() - recent[i].block_time())
            .clamp(min_solvetime, max_solvetime);

        weighted_solvetimes += solvetime * i as i64;
        weights_sum += i as i64;

        // negative or overflowing bits never make it into an accepted chain;
        // the raw magnitude is what the window committed to
        sum_target = sum_target
            .overflowing_add(decode_compact(recent[i - 1].bits).target)
            .0;
    }

    let mut avg_solvetime = weighted_solvetimes as f64 / weights_sum as f64;
    if avg_solvetime <= 0.0 {
        avg_solvetime = 1.0;
    }

    let adjustment = (spacing as f64 / avg_solvetime).clamp(MIN_ADJUSTMENT, MAX_ADJUSTMENT);

    let avg_target = sum_target / U256::from(window);
    #[allow(clippy::float_cmp)]
    let next_target = if adjustment != 1.0 {
        let adjustment_scaled = (adjustment * LWMA_SCALE as f64) as u64;
        avg_target.overflowing_mul(U256::from(LWMA_SCALE)).0 / U256::from(adjustment_scaled)
    } else {
        avg_target
    };

    let limited = next_target.min(params.pow_limit);
    if limited.is_zero() {
        U256::one()
    } else {
        limited
    }
}

/// Legacy period-based retarget entry point.
///
/// Kept so older call sites still link; LWMA does all the work in
/// [`next_work_required`], so this only normalises the tip's bits.
pub fn calculate_next_work_required(
    tip: &BlockIndex,
    _first_block_time: i64,
    params: &ConsensusParams,
) -> u32 {
    if params.pow_no_retargeting {
        return tip.bits;
    }
    target_to_compact(&decode_compact(tip.bits).target)
}

/// Check that a single-step difficulty change stays within the bounds the
/// retarget can produce.
///
/// Used where full ancestor history is unavailable (header sync): the new
/// target must lie in `[old * 0.80, min(old * 1.33, pow_limit)]`.
pub fn permitted_difficulty_transition(
    params: &ConsensusParams,
    _height: i64,
    old_bits: u32,
    new_bits: u32,
) -> bool {
    if params.pow_allow_min_difficulty_blocks {
        return true;
    }

    let (Ok(old_target), Ok(new_target)) = (compact_to_target(old_bits), compact_to_target(new_bits))
    else {
        return false;
    };

    if new_target > params.pow_limit {
        return false;
    }

    let max_target =
        (old_target.overflowing_mul(U256::from(133u64)).0 / U256::from(100u64)).min(params.pow_limit);
    let min_target = old_target.overflowing_mul(U256::from(80u64)).0 / U256::from(100u64);

    new_target >= min_target && new_target <= max_target
}
