//! Chain parameter registry
//!
//! One immutable [`ChainParams`] per network: the consensus rules, the
//! genesis block and everything a node needs to find and talk to peers.
//! Build one at startup with [`select`] and pass the handle around.

use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use crate::consensus::{
    Bip9Deployment, Block, ConsensusParams, DeploymentPos, MAX_VERSION_BITS_DEPLOYMENTS, U256,
};
use crate::constants::{COIN, GENESIS_TIMESTAMP};
use crate::crypto::{double_hash, Hash};
use crate::validation::write_var_bytes;

use super::genesis::{superaxe_genesis_block, verify_genesis, GenesisInfo, GENESIS_VERSION};
use super::options::{ChainType, Network, RegTestOptions, SigNetOptions};

/// Chain parameter errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChainParamsError {
    #[error("genesis {field} mismatch: expected {expected}, computed {actual}")]
    GenesisMismatch {
        field: &'static str,
        expected: Hash,
        actual: Hash,
    },
    #[error("{0}")]
    InvalidOption(String),
    #[error("Unknown chain {0}.")]
    UnknownChain(String),
}

/// Four bytes opening every peer-to-peer message
pub type MessageStart = [u8; 4];

/// Kinds of base58 version prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base58Type {
    PubkeyAddress = 0,
    ScriptAddress = 1,
    SecretKey = 2,
    ExtPublicKey = 3,
    ExtSecretKey = 4,
}

/// A trusted UTXO-set snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssumeutxoData {
    pub height: u32,
    /// Hash of the serialized UTXO set
    pub hash_serialized: Hash,
    /// Number of transactions up to and including the snapshot block
    pub chain_tx_count: u64,
    pub blockhash: Hash,
}

/// Statistics used to estimate verification progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ChainTxData {
    /// UNIX timestamp of the last known transaction count
    pub time: i64,
    pub tx_count: u64,
    /// Estimated transactions per second after `time`
    pub tx_rate: f64,
}

/// Parameters of one network
#[derive(Debug, Clone, PartialEq)]
pub struct ChainParams {
    chain_type: ChainType,
    consensus: ConsensusParams,
    message_start: MessageStart,
    default_port: u16,
    prune_after_height: u64,
    assumed_blockchain_size: u64,
    assumed_chain_state_size: u64,
    genesis: Block,
    seeds: Vec<String>,
    fixed_seeds: Vec<u8>,
    base58_prefixes: [Vec<u8>; 5],
    bech32_hrp: String,
    default_consistency_checks: bool,
    is_mockable_chain: bool,
    checkpoints: BTreeMap<u32, Hash>,
    assumeutxo: Vec<AssumeutxoData>,
    chain_tx_data: ChainTxData,
}

const MAIN_GENESIS_HASH: Hash =
    Hash::from_hex_const("000000f8fbca27c6b0401c11badfe6525ea6211aa929209cabde3aa4f7c28c12");
const TEST_GENESIS_HASH: Hash =
    Hash::from_hex_const("0000023ec7b5434923708046e5ac5c6c817ad1926646f7d03edcb506295a0267");
const GENESIS_MERKLE_ROOT: Hash =
    Hash::from_hex_const("8e6192d4f0a7428cc73c0209232965c682ee56ab19d5aeca4b30e6a08f35a05d");

/// 0000ffff00000000...
const MAIN_POW_LIMIT: U256 = U256([0, 0, 0, 0x0000_ffff_0000_0000]);
/// 0000077aefffffff...
const TEST_POW_LIMIT: U256 = U256([u64::MAX, u64::MAX, u64::MAX, 0x0000_077a_efff_ffff]);
/// 00000377ae000000...
const SIGNET_POW_LIMIT: U256 = U256([0, 0, 0, 0x0000_0377_ae00_0000]);
/// 7fffffffffffffff...
const REGTEST_POW_LIMIT: U256 = U256([u64::MAX, u64::MAX, u64::MAX, 0x7fff_ffff_ffff_ffff]);

/// 1-of-2 multisig signing the default signet
const DEFAULT_SIGNET_CHALLENGE: [u8; 71] = [
    0x51, 0x21, 0x03, 0xad, 0x5e, 0x0e, 0xda, 0xd1, 0x8c, 0xb1, 0xf0, 0xfc,
    0x0d, 0x28, 0xa3, 0xd4, 0xf1, 0xf3, 0xe4, 0x45, 0x64, 0x03, 0x37, 0x48,
    0x9a, 0xbb, 0x10, 0x40, 0x4f, 0x2d, 0x1e, 0x08, 0x6b, 0xe4, 0x30, 0x21,
    0x03, 0x59, 0xef, 0x50, 0x21, 0x96, 0x4f, 0xe2, 0x2d, 0x6f, 0x8e, 0x05,
    0xb2, 0x46, 0x3c, 0x95, 0x40, 0xce, 0x96, 0x88, 0x3f, 0xe3, 0xb2, 0x78,
    0x76, 0x0f, 0x04, 0x8f, 0x51, 0x89, 0xf2, 0xe6, 0xc4, 0x52, 0xae,
];

const LWMA_WINDOW: u32 = 60;

fn mainnet_prefixes() -> [Vec<u8>; 5] {
    [
        vec![63],
        vec![75],
        vec![191],
        vec![0x04, 0x88, 0xB2, 0x1E],
        vec![0x04, 0x88, 0xAD, 0xE4],
    ]
}

fn testnet_prefixes() -> [Vec<u8>; 5] {
    [
        vec![111],
        vec![196],
        vec![239],
        vec![0x04, 0x35, 0x87, 0xCF],
        vec![0x04, 0x35, 0x83, 0x94],
    ]
}

/// Testdummy never activates (unless overridden), taproot is active from
/// genesis.
fn default_deployments() -> [Bip9Deployment; MAX_VERSION_BITS_DEPLOYMENTS] {
    [
        Bip9Deployment::new(28, Bip9Deployment::NEVER_ACTIVE, Bip9Deployment::NO_TIMEOUT, 0),
        Bip9Deployment::new(2, Bip9Deployment::ALWAYS_ACTIVE, Bip9Deployment::NO_TIMEOUT, 0),
    ]
}

fn seeds(hosts: &[&str]) -> Vec<String> {
    hosts.iter().map(|host| host.to_string()).collect()
}

/// First four bytes of the double hash of the serialized challenge
pub fn signet_message_start(challenge: &[u8]) -> MessageStart {
    let mut serialized = Vec::with_capacity(challenge.len() + 9);
    write_var_bytes(&mut serialized, challenge);
    let hash = double_hash(&serialized);
    let mut magic = [0u8; 4];
    magic.copy_from_slice(&hash.as_bytes()[..4]);
    magic
}

impl ChainParams {
    /// Main network on which people trade goods and services
    pub fn main() -> Result<Self, ChainParamsError> {
        let genesis =
            superaxe_genesis_block(GENESIS_TIMESTAMP, 18_201_374, 0x1e00ffff, GENESIS_VERSION, 500 * COIN);
        verify_genesis(&genesis, &MAIN_GENESIS_HASH, &GENESIS_MERKLE_ROOT)?;

        let consensus = ConsensusParams {
            hash_genesis_block: genesis.hash(),
            subsidy_halving_interval: 210_000,
            bip34_height: 0,
            bip34_hash: Hash::zero(),
            bip65_height: 0,
            bip66_height: 0,
            csv_height: 0,
            segwit_height: 0,
            min_bip9_warning_height: 0,
            rule_change_activation_threshold: 1815,
            miner_confirmation_window: 2016,
            deployments: default_deployments(),
            pow_limit: MAIN_POW_LIMIT,
            pow_allow_min_difficulty_blocks: false,
            pow_no_retargeting: false,
            pow_target_spacing: 120,
            pow_target_timespan: 60 * 120,
            lwma_averaging_window: LWMA_WINDOW,
            minimum_chain_work: U256::zero(),
            default_assume_valid: Hash::zero(),
            signet_blocks: false,
            signet_challenge: Vec::new(),
        };

        Ok(Self {
            chain_type: ChainType::Main,
            consensus,
            message_start: [0xd4, 0xb3, 0xa2, 0xf1],
            default_port: 8833,
            prune_after_height: 100_000,
            assumed_blockchain_size: 1,
            assumed_chain_state_size: 1,
            checkpoints: BTreeMap::from([(0, MAIN_GENESIS_HASH)]),
            genesis,
            seeds: seeds(&[
                "seed1.superaxecoin.com",
                "seed2.superaxecoin.com",
                "seed3.superaxecoin.com",
                "104.236.106.124",
                "64.225.115.108",
                "161.35.82.147",
            ]),
            fixed_seeds: Vec::new(),
            base58_prefixes: mainnet_prefixes(),
            bech32_hrp: "axe".to_string(),
            default_consistency_checks: false,
            is_mockable_chain: false,
            assumeutxo: Vec::new(),
            chain_tx_data: ChainTxData::default(),
        })
    }

    /// Public test network, reset from time to time
    pub fn test_net() -> Result<Self, ChainParamsError> {
        let genesis =
            superaxe_genesis_block(GENESIS_TIMESTAMP, 725_296, 0x1e0377ae, GENESIS_VERSION, 500 * COIN);
        verify_genesis(&genesis, &TEST_GENESIS_HASH, &GENESIS_MERKLE_ROOT)?;

        let consensus = ConsensusParams {
            hash_genesis_block: genesis.hash(),
            subsidy_halving_interval: 210_000,
            bip34_height: 0,
            bip34_hash: Hash::zero(),
            bip65_height: 0,
            bip66_height: 0,
            csv_height: 0,
            segwit_height: 0,
            min_bip9_warning_height: 0,
            rule_change_activation_threshold: 1512,
            miner_confirmation_window: 2016,
            deployments: default_deployments(),
            pow_limit: TEST_POW_LIMIT,
            pow_allow_min_difficulty_blocks: true,
            pow_no_retargeting: false,
            pow_target_spacing: 120,
            pow_target_timespan: 60 * 120,
            lwma_averaging_window: LWMA_WINDOW,
            minimum_chain_work: U256::zero(),
            default_assume_valid: Hash::zero(),
            signet_blocks: false,
            signet_challenge: Vec::new(),
        };

        Ok(Self {
            chain_type: ChainType::TestNet,
            consensus,
            message_start: [0x0b, 0x11, 0x09, 0x07],
            default_port: 18833,
            prune_after_height: 1000,
            assumed_blockchain_size: 1,
            assumed_chain_state_size: 1,
            checkpoints: BTreeMap::from([(0, TEST_GENESIS_HASH)]),
            genesis,
            seeds: seeds(&[
                "testnet-seed1.superaxecoin.com",
                "testnet-seed2.superaxecoin.com",
                "104.236.106.124",
                "64.225.115.108",
                "161.35.82.147",
            ]),
            fixed_seeds: Vec::new(),
            base58_prefixes: testnet_prefixes(),
            bech32_hrp: "taxe".to_string(),
            default_consistency_checks: false,
            is_mockable_chain: false,
            assumeutxo: Vec::new(),
            chain_tx_data: ChainTxData::default(),
        })
    }

    /// Signet: blocks additionally carry a solution to the challenge script
    /// (BIP325). The genesis block is not asserted.
    pub fn sig_net(options: &SigNetOptions) -> Self {
        let mut consensus = ConsensusParams {
            hash_genesis_block: Hash::zero(),
            subsidy_halving_interval: 210_000,
            bip34_height: 1,
            bip34_hash: Hash::zero(),
            bip65_height: 1,
            bip66_height: 1,
            csv_height: 1,
            segwit_height: 1,
            min_bip9_warning_height: 0,
            rule_change_activation_threshold: 1815,
            miner_confirmation_window: 2016,
            deployments: default_deployments(),
            pow_limit: SIGNET_POW_LIMIT,
            pow_allow_min_difficulty_blocks: false,
            pow_no_retargeting: false,
            pow_target_spacing: 10 * 60,
            pow_target_timespan: 14 * 24 * 60 * 60,
            lwma_averaging_window: LWMA_WINDOW,
            minimum_chain_work: U256::zero(),
            default_assume_valid: Hash::zero(),
            signet_blocks: true,
            signet_challenge: Vec::new(),
        };

        let mut seeds_list = Vec::new();
        let (assumed_blockchain_size, chain_tx_data, assumeutxo) = match &options.challenge {
            None => {
                consensus.signet_challenge = DEFAULT_SIGNET_CHALLENGE.to_vec();
                seeds_list = seeds(&[
                    "seed.signet.superaxecoin.sprovoost.nl.",
                    "178.128.221.177",
                    "v7ajjeirttkbnt32wpy3c6w3emwnfr3fkla7hpxcfokr3ysd3kqtzmqd.onion:38333",
                ]);
                consensus.minimum_chain_work = U256([0x0000_01ad_46be_4862, 0, 0, 0]);
                consensus.default_assume_valid = Hash::from_hex_const(
                    "0000013d778ba3f914530f11f6b69869c9fab54acff85acd7b8201d111f19b7f",
                );
                let chain_tx_data = ChainTxData {
                    time: 1_688_366_339,
                    tx_count: 2_262_750,
                    tx_rate: 0.003414084572046456,
                };
                let assumeutxo = vec![AssumeutxoData {
                    height: 160_000,
                    hash_serialized: Hash::from_hex_const(
                        "fe0a44309b74d6b5883d246cb419c6221bcccf0b308c9b59b7d70783dbdf928a",
                    ),
                    chain_tx_count: 2_289_496,
                    blockhash: Hash::from_hex_const(
                        "0000003ca3c99aff040f2563c2ad8f8ec88bd0fd6b8f0895cfaf1ef90353a62c",
                    ),
                }];
                (1, chain_tx_data, assumeutxo)
            }
            Some(challenge) => {
                consensus.signet_challenge = challenge.clone();
                info!("Signet with challenge {}", hex::encode(challenge));
                (0, ChainTxData::default(), Vec::new())
            }
        };

        if let Some(custom) = &options.seeds {
            seeds_list = custom.clone();
        }

        let message_start = signet_message_start(&consensus.signet_challenge);

        let genesis = superaxe_genesis_block(GENESIS_TIMESTAMP, 0, 0x1e0377ae, GENESIS_VERSION, 500 * COIN);
        consensus.hash_genesis_block = genesis.hash();

        Self {
            chain_type: ChainType::SigNet,
            consensus,
            message_start,
            default_port: 38333,
            prune_after_height: 1000,
            assumed_blockchain_size,
            assumed_chain_state_size: 0,
            genesis,
            seeds: seeds_list,
            fixed_seeds: Vec::new(),
            base58_prefixes: testnet_prefixes(),
            bech32_hrp: "tb".to_string(),
            default_consistency_checks: false,
            is_mockable_chain: false,
            checkpoints: BTreeMap::new(),
            assumeutxo,
            chain_tx_data,
        }
    }

    /// Regression test: private networks only, blocks are found instantly
    pub fn reg_test(options: &RegTestOptions) -> Self {
        let mut deployments = default_deployments();
        deployments[DeploymentPos::TestDummy as usize].start_time = 0;

        let mut consensus = ConsensusParams {
            hash_genesis_block: Hash::zero(),
            subsidy_halving_interval: 150,
            bip34_height: 1,
            bip34_hash: Hash::zero(),
            bip65_height: 1,
            bip66_height: 1,
            csv_height: 1,
            segwit_height: 0,
            min_bip9_warning_height: 0,
            rule_change_activation_threshold: 108,
            miner_confirmation_window: 144,
            deployments,
            pow_limit: REGTEST_POW_LIMIT,
            pow_allow_min_difficulty_blocks: true,
            pow_no_retargeting: true,
            pow_target_spacing: 120,
            pow_target_timespan: 60 * 120,
            lwma_averaging_window: LWMA_WINDOW,
            minimum_chain_work: U256::zero(),
            default_assume_valid: Hash::zero(),
            signet_blocks: false,
            signet_challenge: Vec::new(),
        };

        for (&deployment, &height) in &options.activation_heights {
            consensus.set_deployment_height(deployment, height);
        }

        for (&pos, params) in &options.version_bits_parameters {
            let deployment = &mut consensus.deployments[pos as usize];
            deployment.start_time = params.start_time;
            deployment.timeout = params.timeout;
            deployment.min_activation_height = params.min_activation_height;
        }

        let genesis = superaxe_genesis_block(GENESIS_TIMESTAMP, 2, 0x207fffff, GENESIS_VERSION, 500 * COIN);
        consensus.hash_genesis_block = genesis.hash();

        Self {
            chain_type: ChainType::RegTest,
            consensus,
            message_start: [0xfa, 0xbf, 0xb5, 0xda],
            default_port: 18444,
            prune_after_height: if options.fastprune { 100 } else { 1000 },
            assumed_blockchain_size: 0,
            assumed_chain_state_size: 0,
            genesis,
            seeds: seeds(&["dummySeed.invalid."]),
            fixed_seeds: Vec::new(),
            base58_prefixes: testnet_prefixes(),
            bech32_hrp: "axert".to_string(),
            default_consistency_checks: true,
            is_mockable_chain: true,
            checkpoints: BTreeMap::from([(0, Hash::zero())]),
            assumeutxo: Vec::new(),
            chain_tx_data: ChainTxData::default(),
        }
    }

    /// Build the parameters for `network`
    pub fn for_network(network: &Network) -> Result<Self, ChainParamsError> {
        match network {
            Network::Main => Self::main(),
            Network::TestNet => Self::test_net(),
            Network::SigNet(options) => Ok(Self::sig_net(options)),
            Network::RegTest(options) => Ok(Self::reg_test(options)),
        }
    }

    pub fn chain_type(&self) -> ChainType {
        self.chain_type
    }

    pub fn consensus(&self) -> &ConsensusParams {
        &self.consensus
    }

    pub fn message_start(&self) -> &MessageStart {
        &self.message_start
    }

    pub fn default_port(&self) -> u16 {
        self.default_port
    }

    pub fn prune_after_height(&self) -> u64 {
        self.prune_after_height
    }

    /// Minimum free space (in GB) needed to store the block chain
    pub fn assumed_blockchain_size(&self) -> u64 {
        self.assumed_blockchain_size
    }

    /// Minimum free space (in GB) needed to store the chain state
    pub fn assumed_chain_state_size(&self) -> u64 {
        self.assumed_chain_state_size
    }

    pub fn genesis_block(&self) -> &Block {
        &self.genesis
    }

    pub fn genesis_info(&self) -> GenesisInfo {
        GenesisInfo::from_block(&self.genesis)
    }

    pub fn dns_seeds(&self) -> &[String] {
        &self.seeds
    }

    pub fn fixed_seeds(&self) -> &[u8] {
        &self.fixed_seeds
    }

    pub fn base58_prefix(&self, kind: Base58Type) -> &[u8] {
        &self.base58_prefixes[kind as usize]
    }

    pub fn bech32_hrp(&self) -> &str {
        &self.bech32_hrp
    }

    /// Default value for -checkmempool and -checkblockindex
    pub fn default_consistency_checks(&self) -> bool {
        self.default_consistency_checks
    }

    /// Whether block timestamps may be mocked
    pub fn is_mockable_chain(&self) -> bool {
        self.is_mockable_chain
    }

    /// Everything but main is a test chain
    pub fn is_test_chain(&self) -> bool {
        self.chain_type != ChainType::Main
    }

    pub fn checkpoints(&self) -> &BTreeMap<u32, Hash> {
        &self.checkpoints
    }

    pub fn assumeutxo_for_height(&self, height: u32) -> Option<&AssumeutxoData> {
        self.assumeutxo.iter().find(|data| data.height == height)
    }

    pub fn assumeutxo_for_blockhash(&self, blockhash: &Hash) -> Option<&AssumeutxoData> {
        self.assumeutxo.iter().find(|data| data.blockhash == *blockhash)
    }

    pub fn available_snapshot_heights(&self) -> Vec<u32> {
        self.assumeutxo.iter().map(|data| data.height).collect()
    }

    pub fn chain_tx_data(&self) -> &ChainTxData {
        &self.chain_tx_data
    }
}

/// Construct the process-wide parameter handle for `network`.
///
/// Fails if the embedded genesis commitments do not match; the caller
/// must not proceed in that case.
pub fn select(network: &Network) -> Result<Arc<ChainParams>, ChainParamsError> {
    let params = ChainParams::for_network(network)?;
    info!(
        "Using {} chain parameters, genesis {}",
        params.chain_type(),
        params.genesis_block().hash()
    );
    Ok(Arc::new(params))
}
