//! Merkle tree implementation
//!
//! Used for computing transaction merkle roots in blocks.

use super::{hash_pair, Hash};

/// Compute the merkle root of a list of hashes
///
/// If the list is empty, returns zero hash.
/// If odd number of elements, duplicates the last element.
pub fn compute_merkle_root(hashes: &[Hash]) -> Hash {
    compute_merkle_root_checked(hashes).0
}

/// Compute the merkle root and report whether the tree is mutated.
///
/// Duplicating the last element of an odd level means two different
/// transaction lists can share a root. A level that contains two identical
/// adjacent hashes is flagged so callers can reject such blocks.
pub fn compute_merkle_root_checked(hashes: &[Hash]) -> (Hash, bool) {
    if hashes.is_empty() {
        return (Hash::zero(), false);
    }

    let mut mutated = false;
    let mut current_level: Vec<Hash> = hashes.to_vec();

    while current_level.len() > 1 {
        for pair in current_level.chunks_exact(2) {
            if pair[0] == pair[1] {
                mutated = true;
            }
        }

        let mut next_level = Vec::with_capacity(current_level.len().div_ceil(2));
        for pair in current_level.chunks(2) {
            // if there is no right, use the left hash again
            let right = pair.get(1).unwrap_or(&pair[0]);
            next_level.push(hash_pair(&pair[0], right));
        }

        current_level = next_level;
    }

    (current_level[0], mutated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::double_hash;

    fn make_hashes(n: usize) -> Vec<Hash> {
        (0..n).map(|i| double_hash(&i.to_le_bytes())).collect()
    }

    #[test]
    fn test_empty_merkle_root() {
        let root = compute_merkle_root(&[]);
        assert_eq!(root, Hash::zero());
    }

    #[test]
    fn test_single_element() {
        let hashes = make_hashes(1);
        let root = compute_merkle_root(&hashes);
        assert_eq!(root, hashes[0]);
    }

    #[test]
    fn test_two_elements() {
        let hashes = make_hashes(2);
        let root = compute_merkle_root(&hashes);
        let expected = hash_pair(&hashes[0], &hashes[1]);
        assert_eq!(root, expected);
    }

    #[test]
    fn test_odd_number_duplicates_last() {
        let hashes = make_hashes(3);
        let root = compute_merkle_root(&hashes);
        let expected = hash_pair(
            &hash_pair(&hashes[0], &hashes[1]),
            &hash_pair(&hashes[2], &hashes[2]),
        );
        assert_eq!(root, expected);
    }

    #[test]
    fn test_duplicate_tail_is_flagged_as_mutated() {
        let hashes = make_hashes(3);
        let (root, mutated) = compute_merkle_root_checked(&hashes);
        assert!(!mutated);

        let mut padded = hashes.clone();
        padded.push(hashes[2]);
        let (padded_root, padded_mutated) = compute_merkle_root_checked(&padded);
        assert_eq!(root, padded_root);
        assert!(padded_mutated);
    }
}
