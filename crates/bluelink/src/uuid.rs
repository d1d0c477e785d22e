//! Attribute type UUIDs as they appear on an ATT link.
//!
//! ATT responses pack UUIDs as either 2 or 16 little-endian bytes. The
//! canonical textual form is the byte-reversed (big-endian) lowercase hex
//! string without separators, e.g. `2a00` or
//! `6e400001b5a3f393e0a9e50e24dcca9e`. Two UUIDs compare equal only when
//! their canonical strings are equal, so a 16-bit UUID never matches its
//! base-UUID 128-bit expansion.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A 16-bit or 128-bit attribute UUID.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Uuid {
    /// SIG-assigned 16-bit UUID
    Short(u16),
    /// Full 128-bit UUID, little-endian (wire) byte order
    Long([u8; 16]),
}

impl Uuid {
    /// Creates a UUID from a 16-bit SIG-assigned value.
    pub const fn from_u16(uuid16: u16) -> Self {
        Uuid::Short(uuid16)
    }

    /// Creates a 128-bit UUID from 16 bytes in big-endian order.
    pub fn from_bytes_be(mut bytes: [u8; 16]) -> Self {
        bytes.reverse();
        Uuid::Long(bytes)
    }

    /// Tries to create a UUID from a little-endian wire slice.
    ///
    /// Accepts slices of length 2 or 16; returns `None` otherwise.
    pub fn try_from_slice_le(slice: &[u8]) -> Option<Self> {
        match slice.len() {
            2 => Some(Uuid::Short(u16::from_le_bytes([slice[0], slice[1]]))),
            16 => {
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(slice);
                Some(Uuid::Long(bytes))
            }
            _ => None,
        }
    }

    /// Returns the wire (little-endian) encoding.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            Uuid::Short(uuid16) => uuid16.to_le_bytes().to_vec(),
            Uuid::Long(bytes) => bytes.to_vec(),
        }
    }

    /// Returns the 16-bit value for short UUIDs.
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Uuid::Short(uuid16) => Some(*uuid16),
            Uuid::Long(_) => None,
        }
    }
}

impl From<u16> for Uuid {
    fn from(uuid16: u16) -> Self {
        Uuid::Short(uuid16)
    }
}

impl PartialEq<u16> for Uuid {
    fn eq(&self, other: &u16) -> bool {
        self.as_u16() == Some(*other)
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Uuid::Short(uuid16) => write!(f, "{:04x}", uuid16),
            Uuid::Long(bytes) => {
                let mut be = *bytes;
                be.reverse();
                f.write_str(&hex::encode(be))
            }
        }
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uuid({})", self)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UuidParseError {
    #[error("UUID must have 4 or 32 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex in UUID: {0}")]
    HexError(#[from] hex::FromHexError),
}

impl FromStr for Uuid {
    type Err = UuidParseError;

    /// Accepts the canonical form as well as the hyphenated 128-bit form, in
    /// either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.chars().filter(|c| *c != '-').collect();

        match cleaned.len() {
            4 => {
                let mut bytes_be = [0u8; 2];
                hex::decode_to_slice(&cleaned, &mut bytes_be)?;
                Ok(Uuid::Short(u16::from_be_bytes(bytes_be)))
            }
            32 => {
                let mut bytes_be = [0u8; 16];
                hex::decode_to_slice(&cleaned, &mut bytes_be)?;
                Ok(Uuid::from_bytes_be(bytes_be))
            }
            n => Err(UuidParseError::InvalidLength(n)),
        }
    }
}
