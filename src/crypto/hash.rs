//! SHA-256d hashing
//!
//! Headers, transactions and merkle nodes all commit through double SHA-256.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// 32-byte hash output, stored in internal (little-endian) byte order.
///
/// Hex conversion uses the reversed order, which is how block and
/// transaction ids are written everywhere outside the wire format.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// Create a zero hash (used for genesis previous hash)
    pub const fn zero() -> Self {
        Hash([0u8; 32])
    }

    /// Create hash from bytes in internal order
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash(bytes)
    }

    /// Parse a 64-digit display-order hex literal at compile time.
    ///
    /// Intended for hard-coded constants: a malformed literal used in a
    /// `const` fails the build.
    pub const fn from_hex_const(hex: &str) -> Self {
        let digits = hex.as_bytes();
        assert!(digits.len() == 64, "hash literal must be 64 hex digits");

        let mut bytes = [0u8; 32];
        let mut i = 0;
        while i < 32 {
            let hi = hex_digit(digits[2 * i]);
            let lo = hex_digit(digits[2 * i + 1]);
            bytes[31 - i] = (hi << 4) | lo;
            i += 1;
        }
        Hash(bytes)
    }

    /// Create hash from a display-order hex string
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut bytes = hex::decode(hex)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        bytes.reverse();
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Hash(arr))
    }

    /// Convert to display-order hex string
    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    /// Get as bytes (internal order)
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

const fn hex_digit(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit in hash literal"),
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for Hash {
    fn default() -> Self {
        Self::zero()
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Double SHA-256 of arbitrary bytes
pub fn double_hash(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    Hash(second.into())
}

/// Hash two hashes together (for Merkle tree)
pub fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut data = Vec::with_capacity(64);
    data.extend_from_slice(&left.0);
    data.extend_from_slice(&right.0);
    double_hash(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_hash_known_vector() {
        // sha256d("") is a well known constant
        let hash = double_hash(b"");
        assert_eq!(
            hex::encode(hash.0),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_hash_different_inputs() {
        let hash1 = double_hash(b"hello");
        let hash2 = double_hash(b"world");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_zero_hash() {
        let zero = Hash::zero();
        assert_eq!(zero.0, [0u8; 32]);
        assert!(zero.is_zero());
    }

    #[test]
    fn test_hex_is_display_order() {
        let hash = Hash::from_hex(
            "00000000000000000000000000000000000000000000000000000000000000ff",
        )
        .unwrap();
        assert_eq!(hash.0[0], 0xff);
        assert_eq!(hash.0[31], 0x00);
    }

    #[test]
    fn test_hex_roundtrip() {
        let hash = double_hash(b"test");
        let hex = hash.to_hex();
        let recovered = Hash::from_hex(&hex).unwrap();
        assert_eq!(hash, recovered);
        assert_eq!(Hash::from_hex(&format!("0x{}", hex)).unwrap(), hash);
    }

    #[test]
    fn test_const_parse_matches_runtime_parse() {
        const LITERAL: &str = "000000f8fbca27c6b0401c11badfe6525ea6211aa929209cabde3aa4f7c28c12";
        const PARSED: Hash = Hash::from_hex_const(LITERAL);
        assert_eq!(PARSED, Hash::from_hex(LITERAL).unwrap());
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        assert!(Hash::from_hex("abcd").is_err());
    }

    #[test]
    fn test_serde_uses_hex_string() {
        let hash = double_hash(b"serde");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash.to_hex()));
        let back: Hash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_hash_pair() {
        let left = double_hash(b"left");
        let right = double_hash(b"right");
        let combined = hash_pair(&left, &right);

        let reversed = hash_pair(&right, &left);
        assert_ne!(combined, reversed);
    }
}
