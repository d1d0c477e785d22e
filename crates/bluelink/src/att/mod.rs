//! Attribute Protocol (ATT) implementation
//!
//! This module provides the client half of ATT: the PDU codec, the
//! one-request-at-a-time transaction queue and the handle map filled during
//! GATT discovery.

pub mod constants;
pub mod database;
pub mod error;
pub mod queue;
pub mod types;


// Re-export the public API
pub use self::constants::*;
pub use self::database::{Attribute, AttributeDatabase};
pub use self::error::{AttError, AttErrorCode, AttResult};
pub use self::queue::{Flushed, TransactionQueue};
pub use self::types::*;
