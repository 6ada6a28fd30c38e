//! Genesis block generation for SuperAxeCoin
//!
//! Every network starts from the same coinbase: the genesis message paid
//! to a fixed uncompressed key. Only the header fields differ per network.

use serde::Serialize;

use crate::consensus::{Amount, Block, BlockHeader};
use crate::constants::{GENESIS_MESSAGE, GENESIS_OUTPUT_PUBKEY, INITIAL_BLOCK_SUBSIDY};
use crate::crypto::Hash;
use crate::script::{Script, OP_CHECKSIG};
use crate::validation::Transaction;

use super::chainparams::ChainParamsError;

/// Genesis block version
pub const GENESIS_VERSION: i32 = 1;

/// Coinbase value of every genesis block
pub const GENESIS_REWARD: Amount = INITIAL_BLOCK_SUBSIDY;

/// Compact bits pushed first in the genesis scriptSig
const GENESIS_SCRIPT_BITS: i64 = 486_604_799;

/// Create a genesis block from its coinbase message, output script and
/// header fields.
///
/// The coinbase scriptSig commits to the bits constant, the number 4 and
/// the message, in that order. Output is byte-for-byte reproducible.
pub fn create_genesis_block(
    message: &str,
    output_script: Script,
    time: u32,
    nonce: u32,
    bits: u32,
    version: i32,
    reward: Amount,
) -> Block {
    let script_sig = Script::new()
        .push_int(GENESIS_SCRIPT_BITS)
        .push_num(4)
        .push_slice(message.as_bytes());

    let coinbase = Transaction::coinbase(script_sig, reward, output_script);

    let header = BlockHeader::new(version, Hash::zero(), Hash::zero(), time, bits, nonce);
    let mut genesis = Block::new(header, vec![coinbase]);
    genesis.header.merkle_root = genesis.compute_merkle_root();
    genesis
}

/// Pay-to-pubkey script of the genesis output
pub fn genesis_output_script() -> Script {
    Script::new()
        .push_slice(&GENESIS_OUTPUT_PUBKEY)
        .push_opcode(OP_CHECKSIG)
}

/// The SuperAxeCoin genesis block with the given header fields
pub fn superaxe_genesis_block(time: u32, nonce: u32, bits: u32, version: i32, reward: Amount) -> Block {
    create_genesis_block(
        GENESIS_MESSAGE,
        genesis_output_script(),
        time,
        nonce,
        bits,
        version,
        reward,
    )
}

/// Check a constructed genesis block against its hard-coded commitments
pub fn verify_genesis(
    block: &Block,
    expected_hash: &Hash,
    expected_merkle_root: &Hash,
) -> Result<(), ChainParamsError> {
    let hash = block.hash();
    if hash != *expected_hash {
        return Err(ChainParamsError::GenesisMismatch {
            field: "hash",
            expected: *expected_hash,
            actual: hash,
        });
    }
    if block.header.merkle_root != *expected_merkle_root {
        return Err(ChainParamsError::GenesisMismatch {
            field: "merkle root",
            expected: *expected_merkle_root,
            actual: block.header.merkle_root,
        });
    }
    Ok(())
}

/// Genesis block statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenesisInfo {
    pub hash: Hash,
    pub merkle_root: Hash,
    pub time: u32,
    pub nonce: u32,
    pub bits: u32,
    pub version: i32,
    pub reward: Amount,
}

impl GenesisInfo {
    pub fn from_block(block: &Block) -> Self {
        Self {
            hash: block.hash(),
            merkle_root: block.header.merkle_root,
            time: block.header.time,
            nonce: block.header.nonce,
            bits: block.header.bits,
            version: block.header.version,
            reward: block
                .transactions
                .iter()
                .flat_map(|tx| tx.outputs.iter())
                .map(|output| output.value)
                .sum(),
        }
    }
}
