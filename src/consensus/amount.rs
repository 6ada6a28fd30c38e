//! Fixed-point money representation

use crate::constants::MAX_MONEY;

/// Amount in axoshis. Can be negative for transient bookkeeping values
/// such as fee deltas, never for a final balance.
pub type Amount = i64;

/// Check that an amount lies in `[0, MAX_MONEY]`.
///
/// Every externally supplied amount passes through here before it can
/// influence a consensus decision.
pub fn money_range(value: Amount) -> bool {
    (0..=MAX_MONEY).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::COIN;

    #[test]
    fn test_money_range_bounds() {
        assert!(money_range(0));
        assert!(money_range(COIN));
        assert!(money_range(MAX_MONEY));
        assert!(!money_range(-1));
        assert!(!money_range(MAX_MONEY + 1));
        assert!(!money_range(Amount::MIN));
        assert!(!money_range(Amount::MAX));
    }

    #[test]
    fn test_max_money_value() {
        assert_eq!(MAX_MONEY, 21_000_000_000_000_000);
    }
}
