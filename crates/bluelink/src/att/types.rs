//! Type definitions for the ATT protocol
//!
//! Every PDU the client sends or expects back has a fixed layout; all
//! multi-byte integers are little-endian on the wire.
use super::constants::*;
use super::error::{AttError, AttErrorCode, AttResult};
use crate::uuid::Uuid;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

/// ATT packet formats
pub trait AttPacket: Sized {
    /// Opcode for this packet
    fn opcode() -> u8;

    /// Parse packet from bytes
    fn parse(data: &[u8]) -> AttResult<Self>;

    /// Serialize packet to bytes
    fn serialize(&self) -> Vec<u8>;
}

fn read_u16(cursor: &mut Cursor<&[u8]>) -> AttResult<u16> {
    cursor
        .read_u16::<LittleEndian>()
        .map_err(|_| AttError::InvalidPdu)
}

fn check_header(data: &[u8], opcode: u8, min_len: usize) -> AttResult<()> {
    if data.len() < min_len || data[0] != opcode {
        return Err(AttError::InvalidPdu);
    }
    Ok(())
}

fn parse_type_uuid(data: &[u8]) -> AttResult<Uuid> {
    Uuid::try_from_slice_le(data).ok_or(AttError::InvalidPdu)
}

/// Error response packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Request opcode in error
    pub request_opcode: u8,
    /// Attribute handle in error
    pub handle: u16,
    /// Error code
    pub error_code: AttErrorCode,
}

impl ErrorResponse {
    /// Create a new error response
    pub fn new(request_opcode: u8, handle: u16, error_code: AttErrorCode) -> Self {
        Self {
            request_opcode,
            handle,
            error_code,
        }
    }

    /// The error this response reports, as seen by the operation that issued the request
    pub fn to_error(&self) -> AttError {
        AttError::Protocol(self.error_code, self.handle)
    }
}

impl AttPacket for ErrorResponse {
    fn opcode() -> u8 {
        ATT_ERROR_RSP
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 5)?;

        let request_opcode = data[1];
        let mut cursor = Cursor::new(&data[2..]);
        let handle = read_u16(&mut cursor)?;
        let error_code = data[4].into();

        Ok(Self {
            request_opcode,
            handle,
            error_code,
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(5);

        packet.push(Self::opcode());
        packet.push(self.request_opcode);
        packet.extend_from_slice(&self.handle.to_le_bytes());
        packet.push(self.error_code.into());

        packet
    }
}

/// Exchange MTU Request packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeMtuRequest {
    /// Client Rx MTU size
    pub client_mtu: u16,
}

impl AttPacket for ExchangeMtuRequest {
    fn opcode() -> u8 {
        ATT_EXCHANGE_MTU_REQ
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 3)?;

        let mut cursor = Cursor::new(&data[1..]);
        let client_mtu = read_u16(&mut cursor)?;

        Ok(Self { client_mtu })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(3);

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.client_mtu.to_le_bytes());

        packet
    }
}

/// Exchange MTU Response packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeMtuResponse {
    /// Server Rx MTU size
    pub server_mtu: u16,
}

impl AttPacket for ExchangeMtuResponse {
    fn opcode() -> u8 {
        ATT_EXCHANGE_MTU_RSP
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 3)?;

        let mut cursor = Cursor::new(&data[1..]);
        let server_mtu = read_u16(&mut cursor)?;

        Ok(Self { server_mtu })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(3);

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.server_mtu.to_le_bytes());

        packet
    }
}

/// Find Information Request packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindInformationRequest {
    /// First requested handle
    pub start_handle: u16,
    /// Last requested handle
    pub end_handle: u16,
}

impl AttPacket for FindInformationRequest {
    fn opcode() -> u8 {
        ATT_FIND_INFO_REQ
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 5)?;

        let mut cursor = Cursor::new(&data[1..]);
        let start_handle = read_u16(&mut cursor)?;
        let end_handle = read_u16(&mut cursor)?;

        Ok(Self {
            start_handle,
            end_handle,
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(5);

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.start_handle.to_le_bytes());
        packet.extend_from_slice(&self.end_handle.to_le_bytes());

        packet
    }
}

/// Find Information Response packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindInformationResponse {
    /// Handle-UUID pairs, all of the same UUID width
    pub information_data: Vec<(u16, Uuid)>,
}

impl AttPacket for FindInformationResponse {
    fn opcode() -> u8 {
        ATT_FIND_INFO_RSP
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 2)?;

        let pair_size = match data[1] {
            ATT_FIND_INFO_RSP_FORMAT_16BIT => 2 + 2,
            ATT_FIND_INFO_RSP_FORMAT_128BIT => 2 + 16,
            _ => return Err(AttError::InvalidPdu),
        };

        let information_data = data[2..]
            .chunks_exact(pair_size)
            .map(|pair| {
                let handle = u16::from_le_bytes([pair[0], pair[1]]);
                parse_type_uuid(&pair[2..]).map(|uuid| (handle, uuid))
            })
            .collect::<AttResult<Vec<_>>>()?;

        Ok(Self { information_data })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = vec![Self::opcode()];

        let format = match self.information_data.first() {
            Some((_, Uuid::Long(_))) => ATT_FIND_INFO_RSP_FORMAT_128BIT,
            _ => ATT_FIND_INFO_RSP_FORMAT_16BIT,
        };
        packet.push(format);

        for (handle, uuid) in &self.information_data {
            packet.extend_from_slice(&handle.to_le_bytes());
            packet.extend_from_slice(&uuid.to_le_bytes());
        }

        packet
    }
}

/// Read By Type Request packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadByTypeRequest {
    /// First requested handle
    pub start_handle: u16,
    /// Last requested handle
    pub end_handle: u16,
    /// Attribute type UUID
    pub attribute_type: Uuid,
}

impl AttPacket for ReadByTypeRequest {
    fn opcode() -> u8 {
        ATT_READ_BY_TYPE_REQ
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 7)?;

        let mut cursor = Cursor::new(&data[1..]);
        let start_handle = read_u16(&mut cursor)?;
        let end_handle = read_u16(&mut cursor)?;
        let attribute_type = parse_type_uuid(&data[5..])?;

        Ok(Self {
            start_handle,
            end_handle,
            attribute_type,
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(21);

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.start_handle.to_le_bytes());
        packet.extend_from_slice(&self.end_handle.to_le_bytes());
        packet.extend_from_slice(&self.attribute_type.to_le_bytes());

        packet
    }
}

/// Handle and value in Read By Type Response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleValue {
    /// Attribute handle
    pub handle: u16,
    /// Attribute value
    pub value: Vec<u8>,
}

/// Read By Type Response packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadByTypeResponse {
    /// Length of each item
    pub length: u8,
    /// List of handle-value pairs
    pub data: Vec<HandleValue>,
}

impl AttPacket for ReadByTypeResponse {
    fn opcode() -> u8 {
        ATT_READ_BY_TYPE_RSP
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 2)?;

        let length = data[1];
        if length < 2 {
            return Err(AttError::InvalidPdu);
        }

        let data = data[2..]
            .chunks_exact(length as usize)
            .map(|item| HandleValue {
                handle: u16::from_le_bytes([item[0], item[1]]),
                value: item[2..].to_vec(),
            })
            .collect();

        Ok(Self { length, data })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = vec![Self::opcode(), self.length];

        for item in &self.data {
            packet.extend_from_slice(&item.handle.to_le_bytes());
            packet.extend_from_slice(&item.value);
        }

        packet
    }
}

/// Read Request packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    /// Handle to read
    pub handle: u16,
}

impl AttPacket for ReadRequest {
    fn opcode() -> u8 {
        ATT_READ_REQ
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 3)?;

        let mut cursor = Cursor::new(&data[1..]);
        let handle = read_u16(&mut cursor)?;

        Ok(Self { handle })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(3);

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.handle.to_le_bytes());

        packet
    }
}

/// Read Response packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResponse {
    /// Attribute value
    pub value: Vec<u8>,
}

impl AttPacket for ReadResponse {
    fn opcode() -> u8 {
        ATT_READ_RSP
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 1)?;

        Ok(Self {
            value: data[1..].to_vec(),
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(1 + self.value.len());

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.value);

        packet
    }
}

/// Read Blob Request packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadBlobRequest {
    /// Handle to read
    pub handle: u16,
    /// Offset to start reading from
    pub offset: u16,
}

impl AttPacket for ReadBlobRequest {
    fn opcode() -> u8 {
        ATT_READ_BLOB_REQ
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 5)?;

        let mut cursor = Cursor::new(&data[1..]);
        let handle = read_u16(&mut cursor)?;
        let offset = read_u16(&mut cursor)?;

        Ok(Self { handle, offset })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(5);

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.handle.to_le_bytes());
        packet.extend_from_slice(&self.offset.to_le_bytes());

        packet
    }
}

/// Read Blob Response packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadBlobResponse {
    /// Attribute value part
    pub value: Vec<u8>,
}

impl AttPacket for ReadBlobResponse {
    fn opcode() -> u8 {
        ATT_READ_BLOB_RSP
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 1)?;

        Ok(Self {
            value: data[1..].to_vec(),
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(1 + self.value.len());

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.value);

        packet
    }
}

/// Read By Group Type Request packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadByGroupTypeRequest {
    /// First requested handle
    pub start_handle: u16,
    /// Last requested handle
    pub end_handle: u16,
    /// Group type UUID
    pub group_type: Uuid,
}

impl AttPacket for ReadByGroupTypeRequest {
    fn opcode() -> u8 {
        ATT_READ_BY_GROUP_TYPE_REQ
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 7)?;

        let mut cursor = Cursor::new(&data[1..]);
        let start_handle = read_u16(&mut cursor)?;
        let end_handle = read_u16(&mut cursor)?;
        let group_type = parse_type_uuid(&data[5..])?;

        Ok(Self {
            start_handle,
            end_handle,
            group_type,
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(21);

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.start_handle.to_le_bytes());
        packet.extend_from_slice(&self.end_handle.to_le_bytes());
        packet.extend_from_slice(&self.group_type.to_le_bytes());

        packet
    }
}

/// Group entry in Read By Group Type Response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupValue {
    /// Attribute handle
    pub handle: u16,
    /// End group handle
    pub end_group_handle: u16,
    /// Attribute value
    pub value: Vec<u8>,
}

/// Read By Group Type Response packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadByGroupTypeResponse {
    /// Length of each item
    pub length: u8,
    /// List of group entries
    pub data: Vec<GroupValue>,
}

impl AttPacket for ReadByGroupTypeResponse {
    fn opcode() -> u8 {
        ATT_READ_BY_GROUP_TYPE_RSP
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 2)?;

        let length = data[1];
        if length < 4 {
            return Err(AttError::InvalidPdu);
        }

        let data = data[2..]
            .chunks_exact(length as usize)
            .map(|item| GroupValue {
                handle: u16::from_le_bytes([item[0], item[1]]),
                end_group_handle: u16::from_le_bytes([item[2], item[3]]),
                value: item[4..].to_vec(),
            })
            .collect();

        Ok(Self { length, data })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = vec![Self::opcode(), self.length];

        for item in &self.data {
            packet.extend_from_slice(&item.handle.to_le_bytes());
            packet.extend_from_slice(&item.end_group_handle.to_le_bytes());
            packet.extend_from_slice(&item.value);
        }

        packet
    }
}

/// Write Request packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    /// Handle to write
    pub handle: u16,
    /// Value to write
    pub value: Vec<u8>,
}

impl AttPacket for WriteRequest {
    fn opcode() -> u8 {
        ATT_WRITE_REQ
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 3)?;

        let mut cursor = Cursor::new(&data[1..]);
        let handle = read_u16(&mut cursor)?;

        Ok(Self {
            handle,
            value: data[3..].to_vec(),
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(3 + self.value.len());

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.handle.to_le_bytes());
        packet.extend_from_slice(&self.value);

        packet
    }
}

/// Write Response packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResponse;

impl AttPacket for WriteResponse {
    fn opcode() -> u8 {
        ATT_WRITE_RSP
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 1)?;
        Ok(Self)
    }

    fn serialize(&self) -> Vec<u8> {
        vec![Self::opcode()]
    }
}

/// Write Command packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteCommand {
    /// Handle to write
    pub handle: u16,
    /// Value to write
    pub value: Vec<u8>,
}

impl AttPacket for WriteCommand {
    fn opcode() -> u8 {
        ATT_WRITE_CMD
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 3)?;

        let mut cursor = Cursor::new(&data[1..]);
        let handle = read_u16(&mut cursor)?;

        Ok(Self {
            handle,
            value: data[3..].to_vec(),
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(3 + self.value.len());

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.handle.to_le_bytes());
        packet.extend_from_slice(&self.value);

        packet
    }
}

/// Prepare Write Request packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareWriteRequest {
    /// Handle to write
    pub handle: u16,
    /// Offset to write at
    pub offset: u16,
    /// Part of the value
    pub value: Vec<u8>,
}

impl AttPacket for PrepareWriteRequest {
    fn opcode() -> u8 {
        ATT_PREPARE_WRITE_REQ
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 5)?;

        let mut cursor = Cursor::new(&data[1..]);
        let handle = read_u16(&mut cursor)?;
        let offset = read_u16(&mut cursor)?;

        Ok(Self {
            handle,
            offset,
            value: data[5..].to_vec(),
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(5 + self.value.len());

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.handle.to_le_bytes());
        packet.extend_from_slice(&self.offset.to_le_bytes());
        packet.extend_from_slice(&self.value);

        packet
    }
}

/// Prepare Write Response packet; the server echoes the request fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareWriteResponse {
    /// Handle written
    pub handle: u16,
    /// Offset written at
    pub offset: u16,
    /// Part of the value
    pub value: Vec<u8>,
}

impl AttPacket for PrepareWriteResponse {
    fn opcode() -> u8 {
        ATT_PREPARE_WRITE_RSP
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 5)?;

        let mut cursor = Cursor::new(&data[1..]);
        let handle = read_u16(&mut cursor)?;
        let offset = read_u16(&mut cursor)?;

        Ok(Self {
            handle,
            offset,
            value: data[5..].to_vec(),
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(5 + self.value.len());

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.handle.to_le_bytes());
        packet.extend_from_slice(&self.offset.to_le_bytes());
        packet.extend_from_slice(&self.value);

        packet
    }
}

/// Whether an Execute Write Request commits or discards the prepared queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecuteWrite {
    /// Write all prepared values
    #[default]
    Commit,
    /// Discard all prepared values
    Cancel,
}

impl ExecuteWrite {
    pub fn flags(&self) -> u8 {
        match self {
            ExecuteWrite::Commit => ATT_EXEC_WRITE_COMMIT,
            ExecuteWrite::Cancel => ATT_EXEC_WRITE_CANCEL,
        }
    }
}

/// Execute Write Request packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteWriteRequest {
    /// Commit or cancel
    pub execute: ExecuteWrite,
}

impl AttPacket for ExecuteWriteRequest {
    fn opcode() -> u8 {
        ATT_EXECUTE_WRITE_REQ
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 2)?;

        let execute = match data[1] {
            ATT_EXEC_WRITE_CANCEL => ExecuteWrite::Cancel,
            ATT_EXEC_WRITE_COMMIT => ExecuteWrite::Commit,
            _ => return Err(AttError::InvalidPdu),
        };

        Ok(Self { execute })
    }

    fn serialize(&self) -> Vec<u8> {
        vec![Self::opcode(), self.execute.flags()]
    }
}

/// Execute Write Response packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteWriteResponse;

impl AttPacket for ExecuteWriteResponse {
    fn opcode() -> u8 {
        ATT_EXECUTE_WRITE_RSP
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 1)?;
        Ok(Self)
    }

    fn serialize(&self) -> Vec<u8> {
        vec![Self::opcode()]
    }
}

/// Handle Value Notification packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleValueNotification {
    /// Attribute handle
    pub handle: u16,
    /// Attribute value
    pub value: Vec<u8>,
}

impl AttPacket for HandleValueNotification {
    fn opcode() -> u8 {
        ATT_HANDLE_VALUE_NTF
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 3)?;

        let mut cursor = Cursor::new(&data[1..]);
        let handle = read_u16(&mut cursor)?;

        Ok(Self {
            handle,
            value: data[3..].to_vec(),
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(3 + self.value.len());

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.handle.to_le_bytes());
        packet.extend_from_slice(&self.value);

        packet
    }
}

/// Handle Value Indication packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleValueIndication {
    /// Attribute handle
    pub handle: u16,
    /// Attribute value
    pub value: Vec<u8>,
}

impl AttPacket for HandleValueIndication {
    fn opcode() -> u8 {
        ATT_HANDLE_VALUE_IND
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 3)?;

        let mut cursor = Cursor::new(&data[1..]);
        let handle = read_u16(&mut cursor)?;

        Ok(Self {
            handle,
            value: data[3..].to_vec(),
        })
    }

    fn serialize(&self) -> Vec<u8> {
        let mut packet = Vec::with_capacity(3 + self.value.len());

        packet.push(Self::opcode());
        packet.extend_from_slice(&self.handle.to_le_bytes());
        packet.extend_from_slice(&self.value);

        packet
    }
}

/// Handle Value Confirmation packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleValueConfirmation;

impl AttPacket for HandleValueConfirmation {
    fn opcode() -> u8 {
        ATT_HANDLE_VALUE_CONF
    }

    fn parse(data: &[u8]) -> AttResult<Self> {
        check_header(data, Self::opcode(), 1)?;
        Ok(Self)
    }

    fn serialize(&self) -> Vec<u8> {
        vec![Self::opcode()]
    }
}

/// Opcode of a raw PDU, if it has one
pub fn pdu_opcode(pdu: &[u8]) -> Option<u8> {
    pdu.first().copied()
}

/// Whether an opcode can only have been sent by the peer acting as a client.
///
/// Requests and commands carry even opcodes; nothing even answers one of ours.
pub fn is_peer_originated(opcode: u8) -> bool {
    opcode % 2 == 0
}

/// Whether an opcode names a request the peer expects a response to.
///
/// Commands set bit 6 and never get a reply.
pub fn is_peer_request(opcode: u8) -> bool {
    is_peer_originated(opcode) && opcode & ATT_OPCODE_COMMAND_FLAG == 0
}
