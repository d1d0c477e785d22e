//! Security Manager Protocol (SMP) implementation
//!
//! This module implements the initiator side of LE legacy pairing with the
//! Just Works association model:
//! - building and parsing SMP PDUs
//! - the confirm/random exchange and its c1/s1 cryptography
//! - handing the derived short-term key to the transport
//!
//! Distributed keys are surfaced as events and never stored.

pub mod constants;
pub mod crypto;
pub mod manager;
pub mod pairing;
pub mod types;


// Re-export public API
pub use self::manager::SmpManager;
pub use self::pairing::{PairingSession, PairingState};
pub use self::types::*;
