//! Script verification entry point
//!
//! Validates the inputs a foreign caller hands over, then defers to a
//! [`ScriptInterpreter`] for the actual evaluation.

use thiserror::Error;

use super::builder::Script;
use super::flags::VerifyFlags;
use crate::consensus::Amount;
use crate::validation::{DecodeError, Reader, Transaction, TxOut};

/// Input errors, numbered as the ABI reports them
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptVerifyError {
    #[error("input index out of range")]
    TxIndex,
    #[error("serialized transaction size does not match the buffer length")]
    TxSizeMismatch,
    #[error("transaction could not be deserialized: {0}")]
    TxDeserialize(#[from] DecodeError),
    #[error("witness verification requires the spent amount")]
    AmountRequired,
    #[error("undefined verification flags")]
    InvalidFlags,
    #[error("taproot verification requires all spent outputs")]
    SpentOutputsRequired,
    #[error("spent outputs do not match the transaction inputs")]
    SpentOutputsMismatch,
}

impl ScriptVerifyError {
    /// Stable ABI error code
    pub fn code(&self) -> u32 {
        match self {
            ScriptVerifyError::TxIndex => 1,
            ScriptVerifyError::TxSizeMismatch => 2,
            ScriptVerifyError::TxDeserialize(_) => 3,
            ScriptVerifyError::AmountRequired => 4,
            ScriptVerifyError::InvalidFlags => 5,
            ScriptVerifyError::SpentOutputsRequired => 6,
            ScriptVerifyError::SpentOutputsMismatch => 7,
        }
    }
}

/// Everything an interpreter needs to judge one input
#[derive(Debug, Clone, Copy)]
pub struct ScriptCheck<'a> {
    pub tx: &'a Transaction,
    pub input_index: usize,
    pub script_pubkey: &'a [u8],
    /// Value of the spent output, zero when the caller did not supply it
    pub amount: Amount,
    /// Every output spent by `tx`, in input order
    pub spent_outputs: Option<&'a [TxOut]>,
    pub flags: VerifyFlags,
}

impl<'a> ScriptCheck<'a> {
    pub fn script_sig(&self) -> &'a Script {
        &self.tx.inputs[self.input_index].script_sig
    }

    pub fn witness(&self) -> &'a [Vec<u8>] {
        &self.tx.inputs[self.input_index].witness
    }
}

/// Script evaluation engine.
///
/// Returns whether the input spends its output. Malformed scripts are a
/// `false`, not an error.
pub trait ScriptInterpreter: Send + Sync {
    fn verify(&self, check: &ScriptCheck<'_>) -> bool;
}

/// Verify input `input_index` of the serialized transaction `tx_to`
/// against `script_pubkey`.
///
/// `amount` is `None` for callers of the amount-less ABI variant, which
/// cannot verify witness programs. Input checks run in a fixed order so
/// every caller sees the same error code for the same bad input.
pub fn verify_script(
    interpreter: &dyn ScriptInterpreter,
    script_pubkey: &[u8],
    amount: Option<Amount>,
    tx_to: &[u8],
    spent_outputs: Option<&[TxOut]>,
    input_index: u32,
    flags: u32,
) -> Result<bool, ScriptVerifyError> {
    if amount.is_none() && flags & VerifyFlags::WITNESS.bits() != 0 {
        return Err(ScriptVerifyError::AmountRequired);
    }

    let flags = VerifyFlags::from_raw(flags).ok_or(ScriptVerifyError::InvalidFlags)?;

    if flags.contains(VerifyFlags::TAPROOT) && spent_outputs.is_none() {
        return Err(ScriptVerifyError::SpentOutputsRequired);
    }

    let mut reader = Reader::new(tx_to);
    let tx = Transaction::read_from(&mut reader)?;

    if let Some(spent) = spent_outputs {
        if spent.len() != tx.inputs.len() {
            return Err(ScriptVerifyError::SpentOutputsMismatch);
        }
    }

    let input_index = input_index as usize;
    if input_index >= tx.inputs.len() {
        return Err(ScriptVerifyError::TxIndex);
    }

    if tx.serialized_size() != tx_to.len() {
        return Err(ScriptVerifyError::TxSizeMismatch);
    }

    let check = ScriptCheck {
        tx: &tx,
        input_index,
        script_pubkey,
        amount: amount.unwrap_or(0),
        spent_outputs,
        flags,
    };
    Ok(interpreter.verify(&check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Hash;
    use crate::validation::{OutPoint, TxIn};

    /// Accepts when the scriptSig equals the scriptPubKey
    struct EchoInterpreter;

    impl ScriptInterpreter for EchoInterpreter {
        fn verify(&self, check: &ScriptCheck<'_>) -> bool {
            check.script_sig().as_bytes() == check.script_pubkey
        }
    }

    const PUBKEY_SCRIPT: &[u8] = &[0x51];

    fn spending_tx(inputs: u32) -> Transaction {
        Transaction {
            version: 2,
            inputs: (0..inputs)
                .map(|n| {
                    TxIn::new(
                        OutPoint::new(Hash::zero(), n),
                        Script::from_bytes(PUBKEY_SCRIPT.to_vec()),
                        TxIn::SEQUENCE_FINAL,
                    )
                })
                .collect(),
            outputs: vec![TxOut::new(1_000, Script::new())],
            lock_time: 0,
        }
    }

    fn verify(
        amount: Option<Amount>,
        tx: &[u8],
        spent: Option<&[TxOut]>,
        n_in: u32,
        flags: u32,
    ) -> Result<bool, ScriptVerifyError> {
        verify_script(&EchoInterpreter, PUBKEY_SCRIPT, amount, tx, spent, n_in, flags)
    }

    #[test]
    fn test_valid_input_reaches_interpreter() {
        let tx = spending_tx(2).to_bytes();
        assert_eq!(verify(None, &tx, None, 1, VerifyFlags::P2SH.bits()), Ok(true));
        assert_eq!(
            verify_script(&EchoInterpreter, &[0x52], Some(0), &tx, None, 0, 0),
            Ok(false)
        );
    }

    #[test]
    fn test_amount_required_for_witness() {
        let tx = spending_tx(1).to_bytes();
        let witness = VerifyFlags::WITNESS.bits();
        assert_eq!(verify(None, &tx, None, 0, witness), Err(ScriptVerifyError::AmountRequired));
        assert_eq!(verify(Some(0), &tx, None, 0, witness), Ok(true));
    }

    #[test]
    fn test_invalid_flags() {
        let tx = spending_tx(1).to_bytes();
        assert_eq!(verify(Some(0), &tx, None, 0, 1 << 1), Err(ScriptVerifyError::InvalidFlags));
    }

    #[test]
    fn test_taproot_requires_spent_outputs() {
        let tx = spending_tx(1).to_bytes();
        let flags = VerifyFlags::ALL.bits();
        assert_eq!(verify(Some(0), &tx, None, 0, flags), Err(ScriptVerifyError::SpentOutputsRequired));

        let spent = [TxOut::new(1_000, Script::new())];
        assert_eq!(verify(Some(1_000), &tx, Some(&spent), 0, flags), Ok(true));
    }

    #[test]
    fn test_spent_outputs_must_match_inputs() {
        let tx = spending_tx(2).to_bytes();
        let spent = [TxOut::new(1_000, Script::new())];
        assert_eq!(
            verify(Some(0), &tx, Some(&spent), 0, 0),
            Err(ScriptVerifyError::SpentOutputsMismatch)
        );
    }

    #[test]
    fn test_index_out_of_range() {
        let tx = spending_tx(1).to_bytes();
        assert_eq!(verify(Some(0), &tx, None, 1, 0), Err(ScriptVerifyError::TxIndex));
    }

    #[test]
    fn test_size_mismatch() {
        let mut tx = spending_tx(1).to_bytes();
        tx.push(0);
        assert_eq!(verify(Some(0), &tx, None, 0, 0), Err(ScriptVerifyError::TxSizeMismatch));
    }

    #[test]
    fn test_deserialize_failure() {
        let tx = spending_tx(1).to_bytes();
        assert_eq!(
            verify(Some(0), &tx[..10], None, 0, 0),
            Err(ScriptVerifyError::TxDeserialize(DecodeError::UnexpectedEnd))
        );
    }

    #[test]
    fn test_flag_errors_precede_deserialization() {
        assert_eq!(verify(Some(0), &[], None, 0, 1 << 1), Err(ScriptVerifyError::InvalidFlags));
        assert_eq!(
            verify(None, &[], None, 0, VerifyFlags::WITNESS.bits() | 1 << 1),
            Err(ScriptVerifyError::AmountRequired)
        );
    }

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(ScriptVerifyError::TxIndex.code(), 1);
        assert_eq!(ScriptVerifyError::TxSizeMismatch.code(), 2);
        assert_eq!(ScriptVerifyError::TxDeserialize(DecodeError::UnexpectedEnd).code(), 3);
        assert_eq!(ScriptVerifyError::AmountRequired.code(), 4);
        assert_eq!(ScriptVerifyError::InvalidFlags.code(), 5);
        assert_eq!(ScriptVerifyError::SpentOutputsRequired.code(), 6);
        assert_eq!(ScriptVerifyError::SpentOutputsMismatch.code(), 7);
    }
}
