//! Connection coordinator
//!
//! [`Host`] owns the transport and one [`ConnectionSession`] per link. The
//! link layer feeds it channel data and lifecycle notifications; callers
//! drive GATT operations by connection handle and drain [`Event`]s with
//! [`Host::poll_event`].

use crate::att::{AttResult, ExecuteWrite};
use crate::config::HostConfig;
use crate::error::HostResult;
use crate::gap::DeviceAddress;
use crate::gatt::{GattClient, GattEvent};
use crate::session::ConnectionSession;
use crate::smp::SmpEvent;
use crate::transport::{Transport, ATT_CID, LE_SIGNALING_CID, SMP_CID};
use crate::uuid::Uuid;
use log::{debug, info, trace, warn};
use std::collections::{HashMap, VecDeque};

/// Events surfaced by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A link came up and its session was created
    Connected { connection: u16, peer: DeviceAddress },
    /// A link went down and its session was dropped
    Disconnected { connection: u16 },
    /// Link encryption changed
    EncryptionChanged { connection: u16, encrypted: bool },
    /// GATT client event
    Gatt { connection: u16, event: GattEvent },
    /// Pairing event
    Security { connection: u16, event: SmpEvent },
}

/// Client-side host for any number of concurrent links
#[derive(Debug)]
pub struct Host<T: Transport> {
    transport: T,
    config: HostConfig,
    /// Sessions by connection handle
    sessions: HashMap<u16, ConnectionSession>,
    events: VecDeque<Event>,
}

impl<T: Transport> Host<T> {
    /// Create a host writing to `transport`
    pub fn new(transport: T, config: HostConfig) -> Self {
        Self {
            transport,
            config,
            sessions: HashMap::new(),
            events: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Session of an established connection
    pub fn session(&self, connection: u16) -> Option<&ConnectionSession> {
        self.sessions.get(&connection)
    }

    /// Handles of every established connection
    pub fn connections(&self) -> Vec<u16> {
        let mut connections: Vec<u16> = self.sessions.keys().copied().collect();
        connections.sort_unstable();
        connections
    }

    /// Next pending event
    pub fn poll_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    /// A link was established
    pub fn on_connection_established(&mut self, connection: u16, local: DeviceAddress, peer: DeviceAddress) {
        info!(
            "Connection 0x{:04x} established with {} ({:?})",
            connection, peer.address, peer.address_type
        );

        let session = ConnectionSession::new(connection, local, peer, self.config.multi_role);
        if self.sessions.insert(connection, session).is_some() {
            warn!("Connection 0x{:04x} replaced an existing session", connection);
        }
        self.events.push_back(Event::Connected { connection, peer });

        if let Some(mtu) = self.config.preferred_mtu {
            if let Err(err) = self.with_gatt(connection, |gatt, transport| gatt.exchange_mtu(transport, mtu)) {
                warn!("Connection 0x{:04x}: MTU exchange not sent: {}", connection, err);
            }
        }
    }

    /// A link was torn down; all of its pending state is discarded
    pub fn on_connection_terminated(&mut self, connection: u16) {
        if self.sessions.remove(&connection).is_none() {
            warn!("Termination of unknown connection 0x{:04x}", connection);
            return;
        }

        info!("Connection 0x{:04x} terminated", connection);
        self.events.push_back(Event::Disconnected { connection });
    }

    /// Data arrived on a fixed channel; `None` means the channel reached end of stream
    pub fn on_channel_data(&mut self, connection: u16, channel: u16, data: Option<&[u8]>) {
        let Some(session) = self.sessions.get_mut(&connection) else {
            warn!("Channel 0x{:04x} data for unknown connection 0x{:04x}", channel, connection);
            return;
        };

        match (channel, data) {
            (ATT_CID, Some(data)) => session.on_att_data(&mut self.transport, data),
            (ATT_CID, None) => session.on_end_of_stream(),
            (SMP_CID, Some(data)) => session.on_smp_data(&mut self.transport, data),
            (SMP_CID, None) => debug!("Connection 0x{:04x}: SMP stream ended", connection),
            (LE_SIGNALING_CID, _) => {
                trace!("Connection 0x{:04x}: ignoring LE signaling data", connection)
            }
            _ => debug!(
                "Connection 0x{:04x}: ignoring data on channel 0x{:04x}",
                connection, channel
            ),
        }

        self.collect_events(connection);
    }

    /// The controller reported an encryption change
    pub fn on_encryption_changed(&mut self, connection: u16, encrypted: bool) {
        let Some(session) = self.sessions.get_mut(&connection) else {
            warn!("Encryption change for unknown connection 0x{:04x}", connection);
            return;
        };

        debug!("Connection 0x{:04x}: encryption {}", connection, if encrypted { "on" } else { "off" });
        session.on_encryption_changed(encrypted);
        self.events.push_back(Event::EncryptionChanged { connection, encrypted });
    }

    /// Request a larger MTU
    pub fn exchange_mtu(&mut self, connection: u16, mtu: u16) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| gatt.exchange_mtu(transport, mtu))
    }

    /// Discover primary services; an empty filter reports them all
    pub fn discover_services(&mut self, connection: u16, filter: &[Uuid]) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| gatt.discover_services(transport, filter))
    }

    pub fn discover_included_services(
        &mut self,
        connection: u16,
        service_handle: u16,
        filter: &[Uuid],
    ) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| {
            gatt.discover_included_services(transport, service_handle, filter)
        })
    }

    pub fn discover_characteristics(
        &mut self,
        connection: u16,
        service_handle: u16,
        filter: &[Uuid],
    ) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| {
            gatt.discover_characteristics(transport, service_handle, filter)
        })
    }

    pub fn discover_descriptors(
        &mut self,
        connection: u16,
        characteristic_handle: u16,
        filter: &[Uuid],
    ) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| {
            gatt.discover_descriptors(transport, characteristic_handle, filter)
        })
    }

    /// Read a characteristic value
    pub fn read(&mut self, connection: u16, characteristic_handle: u16) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| gatt.read(transport, characteristic_handle))
    }

    /// Write a characteristic value, switching to a long write when it does not fit the MTU
    pub fn write(
        &mut self,
        connection: u16,
        characteristic_handle: u16,
        data: &[u8],
        without_response: bool,
    ) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| {
            gatt.write(transport, characteristic_handle, data, without_response)
        })
    }

    pub fn long_write(
        &mut self,
        connection: u16,
        characteristic_handle: u16,
        data: &[u8],
        without_response: bool,
        execute: ExecuteWrite,
    ) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| {
            gatt.long_write(transport, characteristic_handle, data, without_response, execute)
        })
    }

    pub fn read_descriptor(&mut self, connection: u16, descriptor_handle: u16) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| gatt.read_descriptor(transport, descriptor_handle))
    }

    pub fn write_descriptor(&mut self, connection: u16, descriptor_handle: u16, data: &[u8]) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| {
            gatt.write_descriptor(transport, descriptor_handle, data)
        })
    }

    /// Read any attribute by handle
    pub fn read_handle(&mut self, connection: u16, handle: u16) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| gatt.read_handle(transport, handle))
    }

    /// Write any attribute by handle
    pub fn write_handle(
        &mut self,
        connection: u16,
        handle: u16,
        data: &[u8],
        without_response: bool,
    ) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| {
            gatt.write_handle(transport, handle, data, without_response)
        })
    }

    pub fn long_write_handle(
        &mut self,
        connection: u16,
        handle: u16,
        data: &[u8],
        without_response: bool,
        execute: ExecuteWrite,
    ) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| {
            gatt.long_write_handle(transport, handle, data, without_response, execute)
        })
    }

    /// Toggle the broadcast bit of a characteristic's server configuration
    pub fn broadcast(&mut self, connection: u16, characteristic_handle: u16, enable: bool) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| {
            gatt.broadcast(transport, characteristic_handle, enable)
        })
    }

    /// Subscribe to or unsubscribe from a characteristic
    pub fn notify(&mut self, connection: u16, characteristic_handle: u16, enable: bool) -> HostResult<()> {
        self.with_gatt(connection, |gatt, transport| {
            gatt.notify(transport, characteristic_handle, enable)
        })
    }

    fn with_gatt<F>(&mut self, connection: u16, operation: F) -> HostResult<()>
    where
        F: FnOnce(&mut GattClient, &mut dyn Transport) -> AttResult<()>,
    {
        let Some(session) = self.sessions.get_mut(&connection) else {
            warn!("Operation on unknown connection 0x{:04x}", connection);
            return Ok(());
        };

        let result = operation(&mut session.gatt, &mut self.transport);
        self.collect_events(connection);
        Ok(result?)
    }

    fn collect_events(&mut self, connection: u16) {
        let Some(session) = self.sessions.get_mut(&connection) else {
            return;
        };

        while let Some(event) = session.gatt.poll_event() {
            self.events.push_back(Event::Gatt { connection, event });
        }
        while let Some(event) = session.smp.poll_event() {
            self.events.push_back(Event::Security { connection, event });
        }
    }
}
