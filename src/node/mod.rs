//! Node module - network selection, chain parameters and genesis

mod chainparams;
mod genesis;
mod options;

pub use chainparams::*;
pub use genesis::*;
pub use options::*;
