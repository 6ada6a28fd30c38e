//! Consensus module - amounts, targets, block structure, parameters,
//! difficulty, validation and rewards

mod amount;
mod block;
mod difficulty;
mod params;
mod rewards;
mod target;
mod validation;

pub use amount::*;
pub use block::*;
pub use difficulty::*;
pub use params::*;
pub use rewards::*;
pub use target::*;
pub use validation::*;
