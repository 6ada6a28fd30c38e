//! Block-level validation predicates
//!
//! Pure functions that reject headers, blocks and amounts. Failures are
//! ordinary values for the chain-state layer to act on.

use thiserror::Error;

use super::amount::{money_range, Amount};
use super::block::{Block, BlockHeader};
use super::params::ConsensusParams;
use super::target::{compact_to_target, hash_to_u256, CompactError};
use crate::crypto::{compute_merkle_root_checked, Hash};

/// Validation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(transparent)]
    MalformedTarget(#[from] CompactError),
    #[error("compact target {0:#010x} decodes to zero")]
    ZeroTarget(u32),
    #[error("compact target {0:#010x} is easier than the proof-of-work limit")]
    TargetAboveLimit(u32),
    #[error("hash {0} does not meet the claimed target")]
    HighHash(Hash),
    #[error("Invalid merkle root")]
    InvalidMerkleRoot,
    #[error("duplicate transaction makes the merkle tree ambiguous")]
    MutatedMerkleTree,
    #[error("amount {0} is outside the valid money range")]
    AmountOutOfRange(Amount),
}

/// Check that `hash` satisfies the target encoded in `bits`.
///
/// The target must decode cleanly, be non-zero and no easier than the
/// network's limit, and the hash, read as an unsigned 256-bit integer,
/// must not exceed it.
pub fn validate_pow_hash(hash: &Hash, bits: u32, params: &ConsensusParams) -> Result<(), ValidationError> {
    let target = compact_to_target(bits)?;

    if target.is_zero() {
        return Err(ValidationError::ZeroTarget(bits));
    }
    if target > params.pow_limit {
        return Err(ValidationError::TargetAboveLimit(bits));
    }
    if hash_to_u256(hash) > target {
        return Err(ValidationError::HighHash(*hash));
    }

    Ok(())
}

/// Boolean form of [`validate_pow_hash`]
pub fn check_proof_of_work(hash: &Hash, bits: u32, params: &ConsensusParams) -> bool {
    validate_pow_hash(hash, bits, params).is_ok()
}

/// Validate proof of work of a header against its own claimed bits
pub fn validate_pow(header: &BlockHeader, params: &ConsensusParams) -> Result<(), ValidationError> {
    validate_pow_hash(&header.hash(), header.bits, params)
}

/// Validate merkle root matches transactions
pub fn validate_merkle_root(block: &Block) -> Result<(), ValidationError> {
    let txids: Vec<Hash> = block.transactions.iter().map(|tx| tx.txid()).collect();
    let (computed_root, mutated) = compute_merkle_root_checked(&txids);

    if computed_root != block.header.merkle_root {
        return Err(ValidationError::InvalidMerkleRoot);
    }
    if mutated {
        return Err(ValidationError::MutatedMerkleTree);
    }

    Ok(())
}

/// Validate an externally supplied amount
pub fn validate_amount(value: Amount) -> Result<(), ValidationError> {
    if !money_range(value) {
        return Err(ValidationError::AmountOutOfRange(value));
    }
    Ok(())
}
