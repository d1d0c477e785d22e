//! Device addressing shared by the ATT and SMP layers

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::*;
