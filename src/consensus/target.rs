//! 256-bit targets and their 32-bit compact encoding
//!
//! The compact form is `size << 24 | mantissa`, where `size` is the byte
//! length of the target and the mantissa holds its top three bytes. Bit 23
//! of the mantissa is a sign bit, so a mantissa with that bit set is shifted
//! down a byte and the size bumped on encode.

use thiserror::Error;
use uint::construct_uint;

use crate::crypto::Hash;

construct_uint! {
    // unsigned 256-bit integer, 4 x 64-bit little-endian words
    pub struct U256(4);
}

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Compact encodings that cannot describe a valid target
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CompactError {
    #[error("compact target {0:#010x} has the sign bit set")]
    Negative(u32),
    #[error("compact target {0:#010x} overflows 256 bits")]
    Overflow(u32),
}

/// Raw result of expanding a compact value, with both failure flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedCompact {
    pub target: U256,
    pub negative: bool,
    pub overflow: bool,
}

/// Expand a compact value without judging it.
pub fn decode_compact(bits: u32) -> DecodedCompact {
    let size = bits >> 24;
    let mut word = bits & MANTISSA_MASK;

    let target = if size <= 3 {
        word >>= 8 * (3 - size);
        U256::from(word)
    } else {
        U256::from(word) << (8 * (size as usize - 3))
    };

    let negative = word != 0 && bits & SIGN_BIT != 0;
    let overflow = word != 0
        && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

    DecodedCompact {
        target,
        negative,
        overflow,
    }
}

/// Convert compact difficulty to 256-bit target, rejecting negative and
/// overflowing encodings.
pub fn compact_to_target(bits: u32) -> Result<U256, CompactError> {
    let decoded = decode_compact(bits);
    if decoded.negative {
        return Err(CompactError::Negative(bits));
    }
    if decoded.overflow {
        return Err(CompactError::Overflow(bits));
    }
    Ok(decoded.target)
}

/// Convert 256-bit target to compact difficulty
pub fn target_to_compact(target: &U256) -> u32 {
    let mut size = target.bits().div_ceil(8);
    let mut compact = if size <= 3 {
        (target.low_u64() << (8 * (3 - size))) as u32
    } else {
        (*target >> (8 * (size - 3))).low_u64() as u32
    };

    if compact & SIGN_BIT != 0 {
        compact >>= 8;
        size += 1;
    }

    compact | ((size as u32) << 24)
}

/// Interpret a hash as a little-endian 256-bit integer
pub fn hash_to_u256(hash: &Hash) -> U256 {
    U256::from_little_endian(hash.as_bytes())
}

/// Store a 256-bit integer as a hash (little-endian)
pub fn u256_to_hash(value: &U256) -> Hash {
    let mut bytes = [0u8; 32];
    value.to_little_endian(&mut bytes);
    Hash(bytes)
}
