//! Consensus parameters
//!
//! One immutable record per network. Everything that changes the set of
//! valid blocks lives here; transport and policy settings live on
//! `ChainParams`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::target::{target_to_compact, U256};
use crate::crypto::Hash;

/// Version-bits deployments, used as indices into the deployment table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeploymentPos {
    TestDummy = 0,
    Taproot = 1,
}

/// Number of entries in the deployment table
pub const MAX_VERSION_BITS_DEPLOYMENTS: usize = 2;

impl DeploymentPos {
    pub const ALL: [DeploymentPos; MAX_VERSION_BITS_DEPLOYMENTS] =
        [DeploymentPos::TestDummy, DeploymentPos::Taproot];

    pub fn name(&self) -> &'static str {
        match self {
            DeploymentPos::TestDummy => "testdummy",
            DeploymentPos::Taproot => "taproot",
        }
    }
}

impl FromStr for DeploymentPos {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeploymentPos::ALL
            .into_iter()
            .find(|pos| pos.name() == s)
            .ok_or_else(|| format!("Invalid deployment ({})", s))
    }
}

impl fmt::Display for DeploymentPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Soft forks activated at a fixed height rather than by signalling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuriedDeployment {
    /// BIP34: height in coinbase
    HeightInCb,
    /// BIP65: OP_CHECKLOCKTIMEVERIFY
    Cltv,
    /// BIP66: strict DER signatures
    DerSig,
    /// BIP68/112/113: relative lock-time
    Csv,
    /// BIP141/143/147: segregated witness
    Segwit,
}

impl BuriedDeployment {
    pub const ALL: [BuriedDeployment; 5] = [
        BuriedDeployment::HeightInCb,
        BuriedDeployment::Cltv,
        BuriedDeployment::DerSig,
        BuriedDeployment::Csv,
        BuriedDeployment::Segwit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BuriedDeployment::HeightInCb => "bip34",
            BuriedDeployment::Cltv => "cltv",
            BuriedDeployment::DerSig => "dersig",
            BuriedDeployment::Csv => "csv",
            BuriedDeployment::Segwit => "segwit",
        }
    }
}

impl FromStr for BuriedDeployment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuriedDeployment::ALL
            .into_iter()
            .find(|dep| dep.name() == s)
            .ok_or_else(|| format!("Invalid name ({}) for -testactivationheight=name@height.", s))
    }
}

/// How a deployment's start/timeout pair is to be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentSchedule {
    AlwaysActive,
    NeverActive,
    /// Signalling window; `timeout` is `None` for [`Bip9Deployment::NO_TIMEOUT`]
    Window { start: i64, timeout: Option<i64> },
}

/// One entry of the version-bits deployment table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bip9Deployment {
    /// Bit position to select the particular bit in nVersion
    pub bit: u8,
    /// Median time past from which signalling counts
    pub start_time: i64,
    /// Median time past after which the attempt fails
    pub timeout: i64,
    /// Earliest height at which the deployment may become active
    pub min_activation_height: i32,
}

impl Bip9Deployment {
    /// Start-time sentinel: rules are active from genesis
    pub const ALWAYS_ACTIVE: i64 = -1;
    /// Start-time sentinel: the deployment can never activate
    pub const NEVER_ACTIVE: i64 = -2;
    /// Timeout sentinel: signalling never expires
    pub const NO_TIMEOUT: i64 = i64::MAX;

    pub const fn new(bit: u8, start_time: i64, timeout: i64, min_activation_height: i32) -> Self {
        Self {
            bit,
            start_time,
            timeout,
            min_activation_height,
        }
    }

    /// Resolve the sentinels. Real timestamps must only be compared through
    /// the `Window` variant.
    pub fn schedule(&self) -> DeploymentSchedule {
        match self.start_time {
            Self::ALWAYS_ACTIVE => DeploymentSchedule::AlwaysActive,
            Self::NEVER_ACTIVE => DeploymentSchedule::NeverActive,
            start => DeploymentSchedule::Window {
                start,
                timeout: (self.timeout != Self::NO_TIMEOUT).then_some(self.timeout),
            },
        }
    }

    /// Mask of this deployment's bit in a header version
    pub fn mask(&self) -> u32 {
        1u32 << self.bit
    }
}

/// Overrides of a deployment's schedule (regtest only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionBitsParameters {
    pub start_time: i64,
    pub timeout: i64,
    pub min_activation_height: i32,
}

/// Parameters that influence chain consensus
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusParams {
    pub hash_genesis_block: Hash,
    pub subsidy_halving_interval: u32,
    /// Block height at which BIP34 becomes active
    pub bip34_height: i32,
    /// Block hash at which BIP34 becomes active
    pub bip34_hash: Hash,
    /// Block height at which BIP65 becomes active
    pub bip65_height: i32,
    /// Block height at which BIP66 becomes active
    pub bip66_height: i32,
    /// Block height at which CSV (BIP68, BIP112 and BIP113) becomes active
    pub csv_height: i32,
    /// Block height at which Segwit (BIP141, BIP143 and BIP147) becomes active
    pub segwit_height: i32,
    /// Don't warn about unknown BIP9 activations below this height
    pub min_bip9_warning_height: i32,
    /// Blocks within a confirmation window needed to lock in a rule change
    pub rule_change_activation_threshold: u32,
    pub miner_confirmation_window: u32,
    pub deployments: [Bip9Deployment; MAX_VERSION_BITS_DEPLOYMENTS],
    /// Easiest permissible target
    pub pow_limit: U256,
    pub pow_allow_min_difficulty_blocks: bool,
    pub pow_no_retargeting: bool,
    pub pow_target_spacing: i64,
    pub pow_target_timespan: i64,
    /// Number of solve times averaged by the LWMA retarget
    pub lwma_averaging_window: u32,
    pub minimum_chain_work: U256,
    pub default_assume_valid: Hash,
    /// Whether blocks carry a signet solution
    pub signet_blocks: bool,
    pub signet_challenge: Vec<u8>,
}

impl ConsensusParams {
    pub fn difficulty_adjustment_interval(&self) -> i64 {
        self.pow_target_timespan / self.pow_target_spacing
    }

    /// Compact encoding of the proof-of-work limit
    pub fn pow_limit_bits(&self) -> u32 {
        target_to_compact(&self.pow_limit)
    }

    pub fn deployment(&self, pos: DeploymentPos) -> &Bip9Deployment {
        &self.deployments[pos as usize]
    }

    pub fn deployment_height(&self, dep: BuriedDeployment) -> i32 {
        match dep {
            BuriedDeployment::HeightInCb => self.bip34_height,
            BuriedDeployment::Cltv => self.bip65_height,
            BuriedDeployment::DerSig => self.bip66_height,
            BuriedDeployment::Csv => self.csv_height,
            BuriedDeployment::Segwit => self.segwit_height,
        }
    }

    pub fn set_deployment_height(&mut self, dep: BuriedDeployment, height: i32) {
        match dep {
            BuriedDeployment::HeightInCb => self.bip34_height = height,
            BuriedDeployment::Cltv => self.bip65_height = height,
            BuriedDeployment::DerSig => self.bip66_height = height,
            BuriedDeployment::Csv => self.csv_height = height,
            BuriedDeployment::Segwit => self.segwit_height = height,
        }
    }

    /// Whether a buried deployment's rules apply at `height`
    pub fn deployment_active_at(&self, dep: BuriedDeployment, height: i32) -> bool {
        height >= self.deployment_height(dep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_resolves_sentinels() {
        let always = Bip9Deployment::new(2, Bip9Deployment::ALWAYS_ACTIVE, Bip9Deployment::NO_TIMEOUT, 0);
        assert_eq!(always.schedule(), DeploymentSchedule::AlwaysActive);

        let never = Bip9Deployment::new(28, Bip9Deployment::NEVER_ACTIVE, Bip9Deployment::NO_TIMEOUT, 0);
        assert_eq!(never.schedule(), DeploymentSchedule::NeverActive);

        let open = Bip9Deployment::new(28, 0, Bip9Deployment::NO_TIMEOUT, 0);
        assert_eq!(open.schedule(), DeploymentSchedule::Window { start: 0, timeout: None });

        let bounded = Bip9Deployment::new(28, 100, 200, 0);
        assert_eq!(bounded.schedule(), DeploymentSchedule::Window { start: 100, timeout: Some(200) });
    }

    #[test]
    fn test_deployment_mask() {
        assert_eq!(Bip9Deployment::new(28, 0, 0, 0).mask(), 0x1000_0000);
        assert_eq!(Bip9Deployment::new(2, 0, 0, 0).mask(), 0x4);
    }

    #[test]
    fn test_deployment_names_parse() {
        assert_eq!("taproot".parse::<DeploymentPos>(), Ok(DeploymentPos::Taproot));
        assert_eq!("testdummy".parse::<DeploymentPos>(), Ok(DeploymentPos::TestDummy));
        assert!("segwit".parse::<DeploymentPos>().is_err());

        for dep in BuriedDeployment::ALL {
            assert_eq!(dep.name().parse::<BuriedDeployment>(), Ok(dep));
        }
        assert!("taproot".parse::<BuriedDeployment>().is_err());
    }
}
