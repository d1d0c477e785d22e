//! GATT (Generic Attribute Profile) implementation
//!
//! This module provides the client side of GATT: discovery of services,
//! characteristics and descriptors on a remote server, value reads and
//! writes, and delivery of notifications and indications.

pub mod client;
pub mod types;

#[cfg(test)]
mod tests;

pub use crate::att::ExecuteWrite;
pub use client::{AttDispatch, GattClient};
pub use types::{
    Characteristic, CharacteristicProperties, Descriptor, GattEvent, IncludedService,
    SecurityLevel, Service,
};
