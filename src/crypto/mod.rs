//! Cryptography module - SHA-256d hashing and Merkle trees

mod hash;
mod merkle;

pub use hash::*;
pub use merkle::*;
