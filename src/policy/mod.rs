//! Relay policy values shared with the rest of the node

mod feerate;

pub use feerate::*;
