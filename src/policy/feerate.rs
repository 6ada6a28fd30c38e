//! Fee rates
//!
//! A fee rate is an integral number of axoshis per 1000 virtual bytes.
//! Fees derived from it always round up, so a payer never underpays.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;
use std::str::FromStr;
use thiserror::Error;

use crate::consensus::Amount;
use crate::constants::{COIN, CURRENCY_ATOM, CURRENCY_UNIT};

/// Fee rate errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeeRateError {
    #[error("fee for {num_bytes} bytes at {per_k} per kvB overflows")]
    Overflow { per_k: Amount, num_bytes: u32 },
}

/// Which estimator, or which display unit, a caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeeEstimateMode {
    /// Use default settings based on other criteria
    #[default]
    Unset,
    /// Force non-conservative estimates
    Economical,
    /// Force conservative estimates
    Conservative,
    /// AXE/kvB fee rate unit
    AxeKvb,
    /// sat/vB fee rate unit
    SatVb,
}

const ESTIMATE_MODE_NAMES: [(&str, FeeEstimateMode); 3] = [
    ("unset", FeeEstimateMode::Unset),
    ("economical", FeeEstimateMode::Economical),
    ("conservative", FeeEstimateMode::Conservative),
];

impl FromStr for FeeEstimateMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ESTIMATE_MODE_NAMES
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, mode)| *mode)
            .ok_or_else(invalid_estimate_mode_message)
    }
}

/// Message shown for an unrecognised estimate mode
pub fn invalid_estimate_mode_message() -> String {
    let names: Vec<String> = ESTIMATE_MODE_NAMES
        .iter()
        .map(|(name, _)| format!("\"{}\"", name))
        .collect();
    format!("Invalid estimate_mode parameter, must be one of: {}", names.join(", "))
}

/// Fee rate in axoshis per kilovirtualbyte
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRate(Amount);

impl FeeRate {
    /// Rate from an integral number of axoshis per kvB
    pub const fn new(per_k: Amount) -> Self {
        Self(per_k)
    }

    /// Rate implied by paying `fee_paid` for `num_bytes` virtual bytes.
    ///
    /// A zero size gives a zero rate.
    pub fn from_fee(fee_paid: Amount, num_bytes: u32) -> Self {
        if num_bytes == 0 {
            return Self(0);
        }
        let per_k = i128::from(fee_paid) * 1000 / i128::from(num_bytes);
        Self(per_k.clamp(i128::from(Amount::MIN), i128::from(Amount::MAX)) as Amount)
    }

    /// Fee for `num_bytes` virtual bytes, rounded up to the next axoshi.
    ///
    /// A non-zero size at a non-zero rate never costs nothing: a result
    /// that rounds to zero becomes one axoshi in the rate's direction.
    pub fn fee(&self, num_bytes: u32) -> Result<Amount, FeeRateError> {
        let size = Amount::from(num_bytes);
        let product = self.0.checked_mul(size).ok_or(FeeRateError::Overflow {
            per_k: self.0,
            num_bytes,
        })?;

        let mut fee = product.div_euclid(1000) + Amount::from(product.rem_euclid(1000) != 0);

        if fee == 0 && size != 0 {
            fee = self.0.signum();
        }
        Ok(fee)
    }

    /// Fee for 1000 virtual bytes
    pub fn fee_per_k(&self) -> Amount {
        self.0
    }

    pub fn to_string_with_mode(&self, mode: FeeEstimateMode) -> String {
        match mode {
            FeeEstimateMode::SatVb => {
                format!("{}.{:03} {}/vB", self.0 / 1000, self.0 % 1000, CURRENCY_ATOM)
            }
            _ => self.to_string(),
        }
    }
}

impl AddAssign for FeeRate {
    fn add_assign(&mut self, other: FeeRate) {
        self.0 += other.0;
    }
}

/// `"<whole>.<fraction> AXE/kvB"`. Both parts are truncated remainders, so
/// a negative rate carries the sign on each non-zero part, matching the
/// node's existing output.
impl fmt::Display for FeeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:08} {}/kvB", self.0 / COIN, self.0 % COIN, CURRENCY_UNIT)
    }
}
