//! bluelink - client-side Bluetooth Low Energy protocol engine
//!
//! This library drives GATT over ATT against a remote device: MTU
//! negotiation, paginated service/characteristic/descriptor discovery,
//! reads with blob continuation, short and long writes, and
//! notification/indication delivery. ATT errors asking for more security
//! hand over to SMP "Just Works" legacy pairing.
//!
//! The engine does no I/O of its own. Outbound PDUs go through a
//! [`Transport`]; inbound data and connection lifecycle are fed to a
//! [`Host`], which queues [`Event`]s for the caller.

pub mod att;
pub mod config;
pub mod error;
pub mod gap;
pub mod gatt;
pub mod host;
pub mod session;
pub mod smp;
pub mod transport;
pub mod uuid;

// Re-export common types for convenience
pub use att::{AttError, AttErrorCode, AttResult, Attribute, AttributeDatabase, ExecuteWrite};
pub use config::HostConfig;
pub use error::{HostError, HostResult};
pub use gap::{AddressType, BdAddr, DeviceAddress};
pub use gatt::{
    Characteristic, CharacteristicProperties, Descriptor, GattClient, GattEvent, IncludedService,
    SecurityLevel, Service,
};
pub use host::{Event, Host};
pub use session::ConnectionSession;
pub use smp::{SmpError, SmpEvent, SmpManager};
pub use transport::{Transport, ATT_CID, LE_SIGNALING_CID, SMP_CID};
pub use uuid::Uuid;
