//! Type definitions for the Security Manager Protocol
use super::constants::*;
use thiserror::Error;

/// SMP Error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmpError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Passkey entry failed")]
    PasskeyEntryFailed,

    #[error("OOB data not available")]
    OobNotAvailable,

    #[error("Authentication requirements not met")]
    AuthenticationRequirements,

    #[error("Confirm value failed")]
    ConfirmValueFailed,

    #[error("Pairing not supported")]
    PairingNotSupported,

    #[error("Encryption key size issue")]
    EncryptionKeySize,

    #[error("Command not supported")]
    CommandNotSupported,

    #[error("Unspecified reason")]
    UnspecifiedReason,

    #[error("Too many pairing attempts")]
    RepeatedAttempts,

    #[error("Invalid parameters")]
    InvalidParameters,

    #[error("DHKey check failed")]
    DhKeyCheckFailed,

    #[error("Numeric comparison failed")]
    NumericComparisonFailed,

    #[error("BR/EDR pairing in progress")]
    BrEdrPairingInProgress,

    #[error("Cross-transport key not allowed")]
    CrossTransportKeyNotAllowed,

    #[error("Unknown pairing failure reason 0x{0:02x}")]
    UnknownReason(u8),
}

impl SmpError {
    /// Map the reason byte of a Pairing Failed PDU
    pub fn from_reason(reason: u8) -> Self {
        match reason {
            SMP_REASON_PASSKEY_ENTRY_FAILED => SmpError::PasskeyEntryFailed,
            SMP_REASON_OOB_NOT_AVAILABLE => SmpError::OobNotAvailable,
            SMP_REASON_AUTHENTICATION_REQUIREMENTS => SmpError::AuthenticationRequirements,
            SMP_REASON_CONFIRM_VALUE_FAILED => SmpError::ConfirmValueFailed,
            SMP_REASON_PAIRING_NOT_SUPPORTED => SmpError::PairingNotSupported,
            SMP_REASON_ENCRYPTION_KEY_SIZE => SmpError::EncryptionKeySize,
            SMP_REASON_COMMAND_NOT_SUPPORTED => SmpError::CommandNotSupported,
            SMP_REASON_UNSPECIFIED_REASON => SmpError::UnspecifiedReason,
            SMP_REASON_REPEATED_ATTEMPTS => SmpError::RepeatedAttempts,
            SMP_REASON_INVALID_PARAMETERS => SmpError::InvalidParameters,
            SMP_REASON_DHKEY_CHECK_FAILED => SmpError::DhKeyCheckFailed,
            SMP_REASON_NUMERIC_COMPARISON_FAILED => SmpError::NumericComparisonFailed,
            SMP_REASON_BR_EDR_PAIRING_IN_PROGRESS => SmpError::BrEdrPairingInProgress,
            SMP_REASON_CROSS_TRANSPORT_KEY_NOT_ALLOWED => SmpError::CrossTransportKeyNotAllowed,
            other => SmpError::UnknownReason(other),
        }
    }

    /// Reason byte to put in a Pairing Failed PDU, if this error has one
    pub fn reason(&self) -> Option<u8> {
        let reason = match self {
            SmpError::InvalidParameter(_) => return None,
            SmpError::PasskeyEntryFailed => SMP_REASON_PASSKEY_ENTRY_FAILED,
            SmpError::OobNotAvailable => SMP_REASON_OOB_NOT_AVAILABLE,
            SmpError::AuthenticationRequirements => SMP_REASON_AUTHENTICATION_REQUIREMENTS,
            SmpError::ConfirmValueFailed => SMP_REASON_CONFIRM_VALUE_FAILED,
            SmpError::PairingNotSupported => SMP_REASON_PAIRING_NOT_SUPPORTED,
            SmpError::EncryptionKeySize => SMP_REASON_ENCRYPTION_KEY_SIZE,
            SmpError::CommandNotSupported => SMP_REASON_COMMAND_NOT_SUPPORTED,
            SmpError::UnspecifiedReason => SMP_REASON_UNSPECIFIED_REASON,
            SmpError::RepeatedAttempts => SMP_REASON_REPEATED_ATTEMPTS,
            SmpError::InvalidParameters => SMP_REASON_INVALID_PARAMETERS,
            SmpError::DhKeyCheckFailed => SMP_REASON_DHKEY_CHECK_FAILED,
            SmpError::NumericComparisonFailed => SMP_REASON_NUMERIC_COMPARISON_FAILED,
            SmpError::BrEdrPairingInProgress => SMP_REASON_BR_EDR_PAIRING_IN_PROGRESS,
            SmpError::CrossTransportKeyNotAllowed => SMP_REASON_CROSS_TRANSPORT_KEY_NOT_ALLOWED,
            SmpError::UnknownReason(reason) => *reason,
        };
        Some(reason)
    }
}

/// Result type for SMP operations
pub type SmpResult<T> = Result<T, SmpError>;

fn check_len(data: &[u8], len: usize, what: &str) -> SmpResult<()> {
    if data.len() < len {
        return Err(SmpError::InvalidParameter(format!("{} too short", what)));
    }
    Ok(())
}

fn array_16(data: &[u8]) -> [u8; 16] {
    let mut value = [0u8; 16];
    value.copy_from_slice(&data[..16]);
    value
}

/// Pairing request/response packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingRequest {
    /// IO capability
    pub io_capability: u8,
    /// OOB data flag
    pub oob_data_present: u8,
    /// Authentication requirements
    pub auth_req: u8,
    /// Maximum encryption key size
    pub max_key_size: u8,
    /// Initiator key distribution
    pub initiator_key_dist: u8,
    /// Responder key distribution
    pub responder_key_dist: u8,
}

impl PairingRequest {
    /// Features offered for unauthenticated pairing: no IO, no OOB,
    /// bonding without MITM, 16-byte keys, responder distributes its LTK
    pub fn just_works() -> Self {
        Self {
            io_capability: SMP_IO_CAPABILITY_NO_INPUT_NO_OUTPUT,
            oob_data_present: SMP_OOB_NOT_PRESENT,
            auth_req: SMP_AUTH_REQ_BONDING,
            max_key_size: SMP_MAX_ENCRYPTION_KEY_SIZE,
            initiator_key_dist: SMP_KEY_DIST_NONE,
            responder_key_dist: SMP_KEY_DIST_ENC_KEY,
        }
    }

    /// Whether the MITM bit is set
    pub fn requires_mitm(&self) -> bool {
        self.auth_req & SMP_AUTH_REQ_MITM != 0
    }

    /// Parse from raw packet (request or response)
    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        check_len(data, SMP_PAIRING_PDU_LEN, "Pairing request")?;

        Ok(Self {
            io_capability: data[1],
            oob_data_present: data[2],
            auth_req: data[3],
            max_key_size: data[4],
            initiator_key_dist: data[5],
            responder_key_dist: data[6],
        })
    }

    /// Serialize to raw packet
    pub fn serialize(&self, is_request: bool) -> [u8; SMP_PAIRING_PDU_LEN] {
        [
            if is_request {
                SMP_PAIRING_REQUEST
            } else {
                SMP_PAIRING_RESPONSE
            },
            self.io_capability,
            self.oob_data_present,
            self.auth_req,
            self.max_key_size,
            self.initiator_key_dist,
            self.responder_key_dist,
        ]
    }
}

/// Pairing confirm packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingConfirm {
    /// Confirm value
    pub confirm_value: [u8; 16],
}

impl PairingConfirm {
    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        check_len(data, 17, "Pairing confirm")?;

        Ok(Self {
            confirm_value: array_16(&data[1..]),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(17);
        packet.push(SMP_PAIRING_CONFIRM);
        packet.extend_from_slice(&self.confirm_value);
        packet
    }
}

/// Pairing random packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingRandom {
    /// Random value
    pub random_value: [u8; 16],
}

impl PairingRandom {
    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        check_len(data, 17, "Pairing random")?;

        Ok(Self {
            random_value: array_16(&data[1..]),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(17);
        packet.push(SMP_PAIRING_RANDOM);
        packet.extend_from_slice(&self.random_value);
        packet
    }
}

/// Pairing failed packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairingFailed {
    /// Reason code
    pub reason: u8,
}

impl PairingFailed {
    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        check_len(data, 2, "Pairing failed")?;

        Ok(Self { reason: data[1] })
    }

    pub fn serialize(&self) -> Vec<u8> {
        vec![SMP_PAIRING_FAILED, self.reason]
    }

    pub fn error(&self) -> SmpError {
        SmpError::from_reason(self.reason)
    }
}

/// Encryption information packet (LTK)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionInformation {
    /// Long Term Key
    pub long_term_key: [u8; 16],
}

impl EncryptionInformation {
    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        check_len(data, 17, "Encryption information")?;

        Ok(Self {
            long_term_key: array_16(&data[1..]),
        })
    }
}

/// Master identification packet (EDIV and Rand)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterIdentification {
    /// Encrypted diversifier
    pub ediv: u16,
    /// Random number
    pub rand: [u8; 8],
}

impl MasterIdentification {
    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        check_len(data, 11, "Master identification")?;

        let mut rand = [0u8; 8];
        rand.copy_from_slice(&data[3..11]);

        Ok(Self {
            ediv: u16::from_le_bytes([data[1], data[2]]),
            rand,
        })
    }
}

/// Security request packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityRequest {
    /// Authentication requirements
    pub auth_req: u8,
}

impl SecurityRequest {
    pub fn parse(data: &[u8]) -> SmpResult<Self> {
        check_len(data, 2, "Security request")?;

        Ok(Self { auth_req: data[1] })
    }
}

/// Events surfaced by the pairing state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmpEvent {
    /// Pairing Request sent
    PairingStarted,
    /// Peer confirm verified; encryption was requested with the STK
    PairingVerified,
    /// Pairing ended without encryption
    PairingFailed(SmpError),
    /// LTK distributed by the peer
    LongTermKey([u8; 16]),
    /// EDIV and Rand distributed by the peer
    MasterIdentification { ediv: u16, rand: [u8; 8] },
}
