//! Script boundary - script building, verification flags, the interpreter
//! seam and its C ABI

mod builder;
mod ffi;
mod flags;
mod verify;

pub use builder::*;
pub use ffi::*;
pub use flags::*;
pub use verify::*;
