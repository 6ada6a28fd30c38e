//! Transaction structure and wire format
//!
//! UTXO-based transactions in the consensus serialization, with the
//! segregated-witness extension. Only structure lives here; spending
//! rules are the script interpreter's business.

use crate::consensus::Amount;
use crate::crypto::{double_hash, Hash};
use crate::script::Script;

use super::codec::{write_compact_size, write_var_bytes, DecodeError, Reader};

/// Reference to an output of a previous transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutPoint {
    /// Hash of the transaction containing the output
    pub txid: Hash,
    /// Index of the output in that transaction
    pub vout: u32,
}

impl OutPoint {
    pub fn new(txid: Hash, vout: u32) -> Self {
        Self { txid, vout }
    }

    /// The outpoint a coinbase input spends
    pub fn null() -> Self {
        Self::new(Hash::zero(), u32::MAX)
    }

    pub fn is_null(&self) -> bool {
        self.txid.is_zero() && self.vout == u32::MAX
    }
}

/// A transaction input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub prevout: OutPoint,
    pub script_sig: Script,
    pub sequence: u32,
    /// Witness stack, empty for legacy inputs
    pub witness: Vec<Vec<u8>>,
}

impl TxIn {
    /// Sequence number that disables lock-time and relative lock-time
    pub const SEQUENCE_FINAL: u32 = u32::MAX;

    pub fn new(prevout: OutPoint, script_sig: Script, sequence: u32) -> Self {
        Self {
            prevout,
            script_sig,
            sequence,
            witness: Vec::new(),
        }
    }
}

/// A transaction output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    /// Amount in base units
    pub value: Amount,
    pub script_pubkey: Script,
}

impl TxOut {
    pub fn new(value: Amount, script_pubkey: Script) -> Self {
        Self { value, script_pubkey }
    }
}

/// A complete transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction version
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    /// Lock time (block height or timestamp)
    pub lock_time: u32,
}

impl Transaction {
    /// Create a coinbase transaction paying `value` to `script_pubkey`
    pub fn coinbase(script_sig: Script, value: Amount, script_pubkey: Script) -> Self {
        Self {
            version: 1,
            inputs: vec![TxIn::new(OutPoint::null(), script_sig, TxIn::SEQUENCE_FINAL)],
            outputs: vec![TxOut::new(value, script_pubkey)],
            lock_time: 0,
        }
    }

    /// Check if this is a coinbase transaction
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prevout.is_null()
    }

    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }

    /// Transaction id, committing to everything but witnesses
    pub fn txid(&self) -> Hash {
        double_hash(&self.to_bytes_without_witness())
    }

    /// Witness transaction id; equal to the txid without witnesses
    pub fn wtxid(&self) -> Hash {
        double_hash(&self.to_bytes())
    }

    /// Length of [`Transaction::to_bytes`]
    pub fn serialized_size(&self) -> usize {
        self.to_bytes().len()
    }

    /// Full serialization, in the extended format when any input has a
    /// witness
    pub fn to_bytes(&self) -> Vec<u8> {
        self.serialize(self.has_witness())
    }

    pub fn to_bytes_without_witness(&self) -> Vec<u8> {
        self.serialize(false)
    }

    fn serialize(&self, with_witness: bool) -> Vec<u8> {
        let mut bytes = Vec::new();

        bytes.extend_from_slice(&self.version.to_le_bytes());

        if with_witness {
            // marker and flag
            bytes.push(0x00);
            bytes.push(0x01);
        }

        write_compact_size(&mut bytes, self.inputs.len() as u64);
        for input in &self.inputs {
            bytes.extend_from_slice(input.prevout.txid.as_bytes());
            bytes.extend_from_slice(&input.prevout.vout.to_le_bytes());
            write_var_bytes(&mut bytes, input.script_sig.as_bytes());
            bytes.extend_from_slice(&input.sequence.to_le_bytes());
        }

        write_compact_size(&mut bytes, self.outputs.len() as u64);
        for output in &self.outputs {
            bytes.extend_from_slice(&output.value.to_le_bytes());
            write_var_bytes(&mut bytes, output.script_pubkey.as_bytes());
        }

        if with_witness {
            for input in &self.inputs {
                write_compact_size(&mut bytes, input.witness.len() as u64);
                for item in &input.witness {
                    write_var_bytes(&mut bytes, item);
                }
            }
        }

        bytes.extend_from_slice(&self.lock_time.to_le_bytes());

        bytes
    }

    /// Decode a transaction occupying all of `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);
        let tx = Self::read_from(&mut reader)?;
        if reader.remaining() != 0 {
            return Err(DecodeError::TrailingBytes(reader.remaining()));
        }
        Ok(tx)
    }

    /// Decode one transaction from the front of `reader`, leaving any
    /// following bytes unread.
    pub fn read_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let version = reader.read_i32()?;

        let mut flags = 0u8;
        let mut inputs = read_inputs(reader)?;
        let outputs = if inputs.is_empty() {
            // an empty input list is the extended-format marker
            flags = reader.read_u8()?;
            if flags != 0 {
                inputs = read_inputs(reader)?;
                read_outputs(reader)?
            } else {
                Vec::new()
            }
        } else {
            read_outputs(reader)?
        };

        if flags & 1 != 0 {
            flags ^= 1;
            for input in inputs.iter_mut() {
                let items = reader.read_compact_size()?;
                let mut witness = Vec::with_capacity((items as usize).min(reader.remaining()));
                for _ in 0..items {
                    witness.push(reader.read_var_bytes()?);
                }
                input.witness = witness;
            }
            if !inputs.iter().any(|input| !input.witness.is_empty()) {
                return Err(DecodeError::SuperfluousWitness);
            }
        }
        if flags != 0 {
            return Err(DecodeError::UnknownOptionalData);
        }

        let lock_time = reader.read_u32()?;

        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }
}

fn read_inputs(reader: &mut Reader<'_>) -> Result<Vec<TxIn>, DecodeError> {
    let count = reader.read_compact_size()?;
    let mut inputs = Vec::with_capacity((count as usize).min(reader.remaining()));
    for _ in 0..count {
        let txid = reader.read_hash()?;
        let vout = reader.read_u32()?;
        let script_sig = Script::from_bytes(reader.read_var_bytes()?);
        let sequence = reader.read_u32()?;
        inputs.push(TxIn::new(OutPoint::new(txid, vout), script_sig, sequence));
    }
    Ok(inputs)
}

fn read_outputs(reader: &mut Reader<'_>) -> Result<Vec<TxOut>, DecodeError> {
    let count = reader.read_compact_size()?;
    let mut outputs = Vec::with_capacity((count as usize).min(reader.remaining()));
    for _ in 0..count {
        let value = reader.read_i64()?;
        let script_pubkey = Script::from_bytes(reader.read_var_bytes()?);
        outputs.push(TxOut::new(value, script_pubkey));
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spend() -> Transaction {
        Transaction {
            version: 2,
            inputs: vec![TxIn::new(
                OutPoint::new(double_hash(b"funding"), 1),
                Script::new().push_slice(&[0xab; 72]),
                0xffff_fffe,
            )],
            outputs: vec![
                TxOut::new(50_000, Script::new().push_opcode(0x6a)),
                TxOut::new(1_000, Script::new()),
            ],
            lock_time: 100,
        }
    }

    #[test]
    fn test_coinbase_detection() {
        let coinbase = Transaction::coinbase(Script::new().push_int(1), 50, Script::new());
        assert!(coinbase.is_coinbase());
        assert!(!spend().is_coinbase());
    }

    #[test]
    fn test_legacy_decode() {
        let tx = spend();
        let bytes = tx.to_bytes();
        assert_eq!(bytes.len(), tx.serialized_size());
        assert_eq!(Transaction::decode(&bytes), Ok(tx.clone()));
        assert_eq!(tx.txid(), tx.wtxid());
    }

    #[test]
    fn test_witness_changes_wtxid_only() {
        let legacy = spend();
        let mut segwit = legacy.clone();
        segwit.inputs[0].witness = vec![vec![1, 2, 3], vec![]];

        assert!(segwit.has_witness());
        assert_eq!(segwit.txid(), legacy.txid());
        assert_ne!(segwit.wtxid(), legacy.wtxid());

        let bytes = segwit.to_bytes();
        assert_eq!(&bytes[4..6], &[0x00, 0x01]);
        assert_eq!(Transaction::decode(&bytes), Ok(segwit));
    }

    #[test]
    fn test_superfluous_witness_rejected() {
        // extended format with every witness stack empty
        let legacy = spend().to_bytes();
        let mut bytes = legacy[..4].to_vec();
        bytes.extend_from_slice(&[0x00, 0x01]);
        bytes.extend_from_slice(&legacy[4..legacy.len() - 4]);
        bytes.push(0x00);
        bytes.extend_from_slice(&legacy[legacy.len() - 4..]);

        assert_eq!(Transaction::decode(&bytes), Err(DecodeError::SuperfluousWitness));
    }

    #[test]
    fn test_unknown_flag_rejected() {
        let legacy = spend().to_bytes();
        let mut bytes = legacy[..4].to_vec();
        bytes.extend_from_slice(&[0x00, 0x02]);
        bytes.extend_from_slice(&legacy[4..]);

        assert_eq!(Transaction::decode(&bytes), Err(DecodeError::UnknownOptionalData));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut bytes = spend().to_bytes();
        bytes.push(0);
        assert_eq!(Transaction::decode(&bytes), Err(DecodeError::TrailingBytes(1)));

        let mut reader = Reader::new(&bytes);
        assert_eq!(Transaction::read_from(&mut reader), Ok(spend()));
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn test_truncated_rejected() {
        let bytes = spend().to_bytes();
        assert_eq!(
            Transaction::decode(&bytes[..bytes.len() - 1]),
            Err(DecodeError::UnexpectedEnd)
        );
    }
}
