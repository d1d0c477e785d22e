//! Common types for GATT operations
//!
//! Attribute records as discovered on a remote server and the events a GATT
//! client emits as its operations complete.

use crate::att::{AttErrorCode, AttResult};
use crate::uuid::Uuid;
use bitflags::bitflags;

bitflags! {
    /// Characteristic properties as defined in the Bluetooth specification
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CharacteristicProperties: u8 {
        const BROADCAST = 0x01;
        const READ = 0x02;
        const WRITE_WITHOUT_RESPONSE = 0x04;
        const WRITE = 0x08;
        const NOTIFY = 0x10;
        const INDICATE = 0x20;
        const AUTHENTICATED_SIGNED_WRITES = 0x40;
        const EXTENDED_PROPERTIES = 0x80;
    }
}

impl CharacteristicProperties {
    /// Names of the capabilities set in this bitmask, lowest bit first
    pub fn capability_names(&self) -> Vec<&'static str> {
        const NAMES: [(CharacteristicProperties, &str); 8] = [
            (CharacteristicProperties::BROADCAST, "broadcast"),
            (CharacteristicProperties::READ, "read"),
            (CharacteristicProperties::WRITE_WITHOUT_RESPONSE, "writeWithoutResponse"),
            (CharacteristicProperties::WRITE, "write"),
            (CharacteristicProperties::NOTIFY, "notify"),
            (CharacteristicProperties::INDICATE, "indicate"),
            (CharacteristicProperties::AUTHENTICATED_SIGNED_WRITES, "authenticatedSignedWrites"),
            (CharacteristicProperties::EXTENDED_PROPERTIES, "extendedProperties"),
        ];

        NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    pub fn can_read(&self) -> bool {
        self.contains(Self::READ)
    }

    pub fn can_notify(&self) -> bool {
        self.contains(Self::NOTIFY)
    }

    pub fn can_indicate(&self) -> bool {
        self.contains(Self::INDICATE)
    }
}

/// A primary service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    /// Service UUID
    pub uuid: Uuid,
    /// Start handle for this service
    pub start_handle: u16,
    /// End handle for this service
    pub end_handle: u16,
}

/// An include declaration inside a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludedService {
    /// Handle of the include declaration itself
    pub declaration_handle: u16,
    /// Start handle of the included service
    pub start_handle: u16,
    /// End handle of the included service
    pub end_handle: u16,
    /// Only present when the included service has a 16-bit UUID
    pub uuid: Option<Uuid>,
}

/// A characteristic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Characteristic {
    /// Characteristic UUID
    pub uuid: Uuid,
    /// Declaration handle
    pub start_handle: u16,
    /// Last handle belonging to this characteristic
    pub end_handle: u16,
    /// Value handle
    pub value_handle: u16,
    /// Characteristic properties
    pub properties: CharacteristicProperties,
}

impl Characteristic {
    /// Whether there is room for descriptors after the value handle
    pub fn has_descriptor_range(&self) -> bool {
        self.value_handle < self.end_handle
    }
}

/// A characteristic descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub handle: u16,
    pub uuid: Uuid,
}

/// Link security as seen by the ATT layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum SecurityLevel {
    /// No encryption
    #[default]
    Low,
    /// Encrypted with an unauthenticated key
    Medium,
}

/// Completion and delivery events of a GATT client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GattEvent {
    /// MTU exchange finished; carries the MTU now in force
    MtuChanged { mtu: u16 },
    /// Primary service discovery finished
    ServicesDiscovered { services: Vec<Service> },
    /// Included service discovery finished for the service at `service_handle`
    IncludedServicesDiscovered {
        service_handle: u16,
        included: Vec<IncludedService>,
    },
    /// Characteristic discovery finished for the service at `service_handle`
    CharacteristicsDiscovered {
        service_handle: u16,
        characteristics: Vec<Characteristic>,
    },
    /// Descriptor discovery finished for the characteristic at `characteristic_handle`
    DescriptorsDiscovered {
        characteristic_handle: u16,
        descriptors: Vec<Descriptor>,
    },
    /// Characteristic value read finished
    Read {
        characteristic_handle: u16,
        value: Vec<u8>,
        error: Option<AttErrorCode>,
    },
    /// Characteristic value write finished
    Written {
        characteristic_handle: u16,
        result: AttResult<()>,
    },
    /// Descriptor value read finished
    DescriptorRead {
        handle: u16,
        value: Vec<u8>,
        error: Option<AttErrorCode>,
    },
    /// Descriptor value write finished
    DescriptorWritten { handle: u16, result: AttResult<()> },
    /// Raw handle read finished
    HandleRead {
        handle: u16,
        value: Vec<u8>,
        error: Option<AttErrorCode>,
    },
    /// Raw handle write finished
    HandleWritten { handle: u16, result: AttResult<()> },
    /// Broadcast configuration written; carries the requested state
    BroadcastChanged {
        characteristic_handle: u16,
        result: AttResult<bool>,
    },
    /// Notify/indicate configuration written; carries the requested state
    NotifyChanged {
        characteristic_handle: u16,
        result: AttResult<bool>,
    },
    /// Unsolicited value from the peer
    Notification {
        handle: u16,
        characteristic_handle: Option<u16>,
        value: Vec<u8>,
        indication: bool,
    },
    /// Confirmation for an indication was handed to the transport
    IndicationConfirmed { handle: u16 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_names() {
        let properties = CharacteristicProperties::from_bits_truncate(0x1A);
        assert_eq!(properties.capability_names(), vec!["read", "write", "notify"]);

        assert!(CharacteristicProperties::empty().capability_names().is_empty());
        assert_eq!(CharacteristicProperties::all().capability_names().len(), 8);
    }

    #[test]
    fn test_security_level_ordering() {
        assert!(SecurityLevel::Medium > SecurityLevel::Low);
        assert_eq!(SecurityLevel::default(), SecurityLevel::Low);
    }
}
