//! C ABI for script verification
//!
//! Exported with unmangled names so the `cdylib` can be loaded by foreign
//! code. Error codes and flag bits are frozen; callers compare them as
//! integers.

use std::os::raw::{c_int, c_uint};
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

use log::warn;

use super::builder::Script;
use super::verify::{verify_script, ScriptCheck, ScriptInterpreter, ScriptVerifyError};
use crate::validation::TxOut;

/// Version of the exported interface
pub const API_VERSION: c_uint = 2;

/// Error codes written through the `err` out-pointer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxeConsensusError {
    Ok = 0,
    TxIndex,
    TxSizeMismatch,
    TxDeserialize,
    AmountRequired,
    InvalidFlags,
    SpentOutputsRequired,
    SpentOutputsMismatch,
}

impl From<&ScriptVerifyError> for AxeConsensusError {
    fn from(err: &ScriptVerifyError) -> Self {
        match err {
            ScriptVerifyError::TxIndex => AxeConsensusError::TxIndex,
            ScriptVerifyError::TxSizeMismatch => AxeConsensusError::TxSizeMismatch,
            ScriptVerifyError::TxDeserialize(_) => AxeConsensusError::TxDeserialize,
            ScriptVerifyError::AmountRequired => AxeConsensusError::AmountRequired,
            ScriptVerifyError::InvalidFlags => AxeConsensusError::InvalidFlags,
            ScriptVerifyError::SpentOutputsRequired => AxeConsensusError::SpentOutputsRequired,
            ScriptVerifyError::SpentOutputsMismatch => AxeConsensusError::SpentOutputsMismatch,
        }
    }
}

/// A spent output as laid out by C callers
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Utxo {
    pub script_pubkey: *const u8,
    pub script_pubkey_size: c_uint,
    pub value: i64,
}

static INTERPRETER: OnceLock<Box<dyn ScriptInterpreter>> = OnceLock::new();

/// Install the process-wide interpreter behind the exported functions.
///
/// Only the first call wins; a rejected interpreter is handed back.
pub fn install_interpreter(
    interpreter: Box<dyn ScriptInterpreter>,
) -> Result<(), Box<dyn ScriptInterpreter>> {
    INTERPRETER.set(interpreter)
}

/// Stand-in used until an interpreter is installed
struct Unavailable;

impl ScriptInterpreter for Unavailable {
    fn verify(&self, _check: &ScriptCheck<'_>) -> bool {
        warn!("script verification requested but no interpreter is installed");
        false
    }
}

fn interpreter() -> &'static dyn ScriptInterpreter {
    match INTERPRETER.get() {
        Some(interpreter) => interpreter.as_ref(),
        None => &Unavailable,
    }
}

unsafe fn byte_slice<'a>(ptr: *const u8, len: c_uint) -> &'a [u8] {
    if ptr.is_null() || len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len as usize)
    }
}

unsafe fn spent_outputs(ptr: *const Utxo, len: c_uint) -> Option<Vec<TxOut>> {
    if ptr.is_null() {
        return None;
    }
    let utxos: &[Utxo] = if len == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(ptr, len as usize)
    };
    Some(
        utxos
            .iter()
            .map(|utxo| {
                let script = byte_slice(utxo.script_pubkey, utxo.script_pubkey_size);
                TxOut::new(utxo.value, Script::from_bytes(script.to_vec()))
            })
            .collect(),
    )
}

/// Run a verification, translating the outcome into the C convention.
/// A panic is reported as a deserialization failure.
fn report<F>(err: *mut AxeConsensusError, verification: F) -> c_int
where
    F: FnOnce() -> Result<bool, ScriptVerifyError>,
{
    let (valid, code) = match panic::catch_unwind(AssertUnwindSafe(verification)) {
        Ok(Ok(valid)) => (valid, AxeConsensusError::Ok),
        Ok(Err(e)) => (false, AxeConsensusError::from(&e)),
        Err(_) => (false, AxeConsensusError::TxDeserialize),
    };
    if !err.is_null() {
        // SAFETY: the caller passes either null or a writable error slot
        unsafe { *err = code };
    }
    c_int::from(valid)
}

/// Returns 1 if input `n_in` of the serialized transaction `tx_to`
/// correctly spends `script_pubkey` under `flags`.
///
/// # Safety
///
/// Pointers must be null or valid for reads of the given lengths, and
/// `err` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn axeconsensus_verify_script(
    script_pubkey: *const u8,
    script_pubkey_len: c_uint,
    tx_to: *const u8,
    tx_to_len: c_uint,
    n_in: c_uint,
    flags: c_uint,
    err: *mut AxeConsensusError,
) -> c_int {
    let script_pubkey = byte_slice(script_pubkey, script_pubkey_len);
    let tx_to = byte_slice(tx_to, tx_to_len);
    report(err, || {
        verify_script(interpreter(), script_pubkey, None, tx_to, None, n_in, flags)
    })
}

/// As [`axeconsensus_verify_script`], with the value of the spent output.
///
/// # Safety
///
/// See [`axeconsensus_verify_script`].
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn axeconsensus_verify_script_with_amount(
    script_pubkey: *const u8,
    script_pubkey_len: c_uint,
    amount: i64,
    tx_to: *const u8,
    tx_to_len: c_uint,
    n_in: c_uint,
    flags: c_uint,
    err: *mut AxeConsensusError,
) -> c_int {
    let script_pubkey = byte_slice(script_pubkey, script_pubkey_len);
    let tx_to = byte_slice(tx_to, tx_to_len);
    report(err, || {
        verify_script(interpreter(), script_pubkey, Some(amount), tx_to, None, n_in, flags)
    })
}

/// As [`axeconsensus_verify_script_with_amount`], with every output the
/// transaction spends.
///
/// # Safety
///
/// See [`axeconsensus_verify_script`]; `spent_outputs` must be null or
/// point to `spent_outputs_len` valid entries.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn axeconsensus_verify_script_with_spent_outputs(
    script_pubkey: *const u8,
    script_pubkey_len: c_uint,
    amount: i64,
    tx_to: *const u8,
    tx_to_len: c_uint,
    spent_outputs_ptr: *const Utxo,
    spent_outputs_len: c_uint,
    n_in: c_uint,
    flags: c_uint,
    err: *mut AxeConsensusError,
) -> c_int {
    let script_pubkey = byte_slice(script_pubkey, script_pubkey_len);
    let tx_to = byte_slice(tx_to, tx_to_len);
    let spent = spent_outputs(spent_outputs_ptr, spent_outputs_len);
    report(err, || {
        verify_script(
            interpreter(),
            script_pubkey,
            Some(amount),
            tx_to,
            spent.as_deref(),
            n_in,
            flags,
        )
    })
}

#[no_mangle]
pub extern "C" fn axeconsensus_version() -> c_uint {
    API_VERSION
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Hash;
    use crate::script::VerifyFlags;
    use crate::validation::{OutPoint, Transaction, TxIn};

    fn serialized_tx() -> Vec<u8> {
        Transaction {
            version: 1,
            inputs: vec![TxIn::new(OutPoint::new(Hash::zero(), 0), Script::new(), 0)],
            outputs: vec![TxOut::new(10, Script::new())],
            lock_time: 0,
        }
        .to_bytes()
    }

    #[test]
    fn test_version() {
        assert_eq!(axeconsensus_version(), 2);
    }

    #[test]
    fn test_error_code_numbering() {
        assert_eq!(AxeConsensusError::Ok as u32, 0);
        assert_eq!(AxeConsensusError::TxIndex as u32, 1);
        assert_eq!(AxeConsensusError::SpentOutputsMismatch as u32, 7);
        for e in [
            ScriptVerifyError::TxIndex,
            ScriptVerifyError::AmountRequired,
            ScriptVerifyError::SpentOutputsRequired,
        ] {
            assert_eq!(AxeConsensusError::from(&e) as u32, e.code());
        }
    }

    #[test]
    fn test_errors_reported_through_out_pointer() {
        let tx = serialized_tx();
        let mut err = AxeConsensusError::Ok;
        let result = unsafe {
            axeconsensus_verify_script(
                [0x51].as_ptr(),
                1,
                tx.as_ptr(),
                tx.len() as c_uint,
                5,
                0,
                &mut err,
            )
        };
        assert_eq!(result, 0);
        assert_eq!(err, AxeConsensusError::TxIndex);

        let result = unsafe {
            axeconsensus_verify_script(
                [0x51].as_ptr(),
                1,
                tx.as_ptr(),
                tx.len() as c_uint,
                0,
                VerifyFlags::WITNESS.bits(),
                &mut err,
            )
        };
        assert_eq!(result, 0);
        assert_eq!(err, AxeConsensusError::AmountRequired);
    }

    #[test]
    fn test_null_pointers_are_tolerated() {
        let mut err = AxeConsensusError::Ok;
        let result = unsafe {
            axeconsensus_verify_script_with_amount(
                std::ptr::null(),
                0,
                0,
                std::ptr::null(),
                0,
                0,
                0,
                &mut err,
            )
        };
        assert_eq!(result, 0);
        assert_eq!(err, AxeConsensusError::TxDeserialize);

        // a null error slot is simply not written
        let result = unsafe {
            axeconsensus_verify_script(std::ptr::null(), 0, std::ptr::null(), 0, 0, 0, std::ptr::null_mut())
        };
        assert_eq!(result, 0);
    }

    #[test]
    fn test_spent_outputs_converted() {
        let tx = serialized_tx();
        let script = [0x51u8];
        let utxos = [Utxo {
            script_pubkey: script.as_ptr(),
            script_pubkey_size: 1,
            value: 10,
        }];
        let mut err = AxeConsensusError::Ok;
        unsafe {
            axeconsensus_verify_script_with_spent_outputs(
                script.as_ptr(),
                1,
                10,
                tx.as_ptr(),
                tx.len() as c_uint,
                utxos.as_ptr(),
                1,
                0,
                VerifyFlags::ALL.bits(),
                &mut err,
            );
        }
        assert_eq!(err, AxeConsensusError::Ok);

        let converted = unsafe { spent_outputs(utxos.as_ptr(), 1) }.unwrap();
        assert_eq!(converted, vec![TxOut::new(10, Script::from_bytes(vec![0x51]))]);

        unsafe {
            axeconsensus_verify_script_with_spent_outputs(
                script.as_ptr(),
                1,
                10,
                tx.as_ptr(),
                tx.len() as c_uint,
                std::ptr::null(),
                0,
                0,
                VerifyFlags::TAPROOT.bits(),
                &mut err,
            );
        }
        assert_eq!(err, AxeConsensusError::SpentOutputsRequired);
    }
}
