//! Block reward calculation
//!
//! The subsidy starts at 500 AXE and halves every
//! `subsidy_halving_interval` blocks, so issuance converges on
//! `MAX_MONEY` from below.

use super::amount::Amount;
use super::params::ConsensusParams;
use crate::constants::INITIAL_BLOCK_SUBSIDY;

/// Calculate the block subsidy at a given height
///
/// This is a pure, deterministic function.
pub fn block_subsidy(height: u32, params: &ConsensusParams) -> Amount {
    let halvings = height / params.subsidy_halving_interval;

    // shifting by 64 or more is undefined; the subsidy is long gone by then
    if halvings >= 64 {
        return 0;
    }

    INITIAL_BLOCK_SUBSIDY >> halvings
}
