//! Transactions and their consensus wire encoding

mod codec;
mod transaction;

pub use codec::*;
pub use transaction::*;
