//! Client-side attribute handle map
//!
//! Every attribute discovered on the remote server is registered here,
//! keyed by its handle. Entries are never pruned; the map lives exactly as
//! long as the connection that filled it.
use crate::gatt::types::{Characteristic, Descriptor, IncludedService, Service};
use log::debug;
use std::collections::BTreeMap;

/// A discovered attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Service(Service),
    IncludedService(IncludedService),
    Characteristic(Characteristic),
    Descriptor(Descriptor),
}

impl Attribute {
    /// Handle this attribute is registered under
    pub fn handle(&self) -> u16 {
        match self {
            Attribute::Service(service) => service.start_handle,
            Attribute::IncludedService(include) => include.declaration_handle,
            Attribute::Characteristic(characteristic) => characteristic.start_handle,
            Attribute::Descriptor(descriptor) => descriptor.handle,
        }
    }
}

/// Handle map of one connection
#[derive(Debug, Default)]
pub struct AttributeDatabase {
    attributes: BTreeMap<u16, Attribute>,
}

impl AttributeDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an attribute, replacing any earlier entry under the same handle
    pub fn insert(&mut self, attribute: Attribute) {
        let handle = attribute.handle();
        if let Some(previous) = self.attributes.insert(handle, attribute) {
            debug!("Re-registered handle 0x{:04x} (was {:?})", handle, previous);
        }
    }

    /// Get an attribute by handle
    pub fn get(&self, handle: u16) -> Option<&Attribute> {
        self.attributes.get(&handle)
    }

    pub fn service(&self, handle: u16) -> Option<&Service> {
        match self.attributes.get(&handle) {
            Some(Attribute::Service(service)) => Some(service),
            _ => None,
        }
    }

    pub fn characteristic(&self, handle: u16) -> Option<&Characteristic> {
        match self.attributes.get(&handle) {
            Some(Attribute::Characteristic(characteristic)) => Some(characteristic),
            _ => None,
        }
    }

    pub fn descriptor(&self, handle: u16) -> Option<&Descriptor> {
        match self.attributes.get(&handle) {
            Some(Attribute::Descriptor(descriptor)) => Some(descriptor),
            _ => None,
        }
    }

    /// Find the characteristic whose value lives at `value_handle`
    pub fn characteristic_by_value_handle(&self, value_handle: u16) -> Option<&Characteristic> {
        // The declaration always precedes its value
        self.attributes
            .range(..value_handle)
            .rev()
            .find_map(|(_, attribute)| match attribute {
                Attribute::Characteristic(c) if c.value_handle == value_handle => Some(c),
                _ => None,
            })
    }

    /// Number of registered attributes
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.attributes.clear();
    }
}
