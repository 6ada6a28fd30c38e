//! Script verification flags
//!
//! Bit values are part of the stable ABI and must never be renumbered.

use bitflags::bitflags;

bitflags! {
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct VerifyFlags: u32 {
        /// Evaluate P2SH (BIP16) subscripts
        const P2SH = 1 << 0;
        /// Enforce strict DER (BIP66) compliance
        const DERSIG = 1 << 2;
        /// Enforce NULLDUMMY (BIP147)
        const NULLDUMMY = 1 << 4;
        /// Enable CHECKLOCKTIMEVERIFY (BIP65)
        const CHECKLOCKTIMEVERIFY = 1 << 9;
        /// Enable CHECKSEQUENCEVERIFY (BIP112)
        const CHECKSEQUENCEVERIFY = 1 << 10;
        /// Enable WITNESS (BIP141)
        const WITNESS = 1 << 11;
        /// Enable TAPROOT (BIPs 341 & 342)
        const TAPROOT = 1 << 17;
    }
}

impl VerifyFlags {
    /// Union of every defined flag
    pub const ALL: VerifyFlags = VerifyFlags::all();

    /// Parse raw ABI flags, refusing any undefined bit
    pub fn from_raw(bits: u32) -> Option<Self> {
        Self::from_bits(bits)
    }
}
