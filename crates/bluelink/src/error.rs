//! Error types for the bluelink library
//!
//! Operations on the host only fail for local precondition violations
//! detected before anything is written to the link. Everything the peer
//! reports travels in the completion events instead.

use crate::att::AttError;
use thiserror::Error;

/// Errors returned by [`crate::Host`] operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("ATT error: {0}")]
    Att(#[from] AttError),
}

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;
