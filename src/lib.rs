//! SuperAxeCoin consensus core
//!
//! Per-network chain parameters, genesis derivation, LWMA proof-of-work,
//! fixed-point amounts and fee rates, and the ABI-stable script
//! verification boundary.
//!
//! Everything here is pure: parameter handles are built once and shared
//! read-only, and validation functions take their inputs by reference.

pub mod consensus;
pub mod crypto;
pub mod node;
pub mod policy;
pub mod script;
pub mod validation;

/// Protocol constants - HARD-CODED, NEVER CONFIGURABLE
pub mod constants {
    use crate::consensus::Amount;

    /// Number of axoshis in one AXE
    pub const COIN: Amount = 100_000_000;

    /// Upper bound of any valid amount.
    ///
    /// Not the issued supply but a consensus sanity check; changing it forks.
    pub const MAX_MONEY: Amount = 210_000_000 * COIN;

    /// Block subsidy before the first halving
    pub const INITIAL_BLOCK_SUBSIDY: Amount = 500 * COIN;

    /// One formatted unit
    pub const CURRENCY_UNIT: &str = "AXE";

    /// One indivisible minimum value unit
    pub const CURRENCY_ATOM: &str = "sat";

    /// Text committed to by every genesis coinbase
    pub const GENESIS_MESSAGE: &str = "SuperAxeCoin - Mining for the rest of us";

    /// Uncompressed public key paid by every genesis coinbase
    pub const GENESIS_OUTPUT_PUBKEY: [u8; 65] = [
        0x04, 0x67, 0x8a, 0xfd, 0xb0, 0xfe, 0x55, 0x48, 0x27, 0x19, 0x67, 0xf1, 0xa6,
        0x71, 0x30, 0xb7, 0x10, 0x5c, 0xd6, 0xa8, 0x28, 0xe0, 0x39, 0x09, 0xa6, 0x79,
        0x62, 0xe0, 0xea, 0x1f, 0x61, 0xde, 0xb6, 0x49, 0xf6, 0xbc, 0x3f, 0x4c, 0xef,
        0x38, 0xc4, 0xf3, 0x55, 0x04, 0xe5, 0x1e, 0xc1, 0x12, 0xde, 0x5c, 0x38, 0x4d,
        0xf7, 0xba, 0x0b, 0x8d, 0x57, 0x8a, 0x4c, 0x70, 0x2b, 0x6b, 0xf1, 0x1d, 0x5f,
    ];

    /// Genesis timestamp shared by all networks (2024-11-30 00:00:00 UTC)
    pub const GENESIS_TIMESTAMP: u32 = 1_732_924_800;
}
