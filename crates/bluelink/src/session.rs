//! Per-connection session
//!
//! Pairs the GATT client with the SMP manager of one link and routes
//! ATT errors that ask for more security into pairing.

use crate::gap::DeviceAddress;
use crate::gatt::{AttDispatch, GattClient};
use crate::smp::SmpManager;
use crate::transport::Transport;
use log::debug;

/// State owned by one established connection
#[derive(Debug)]
pub struct ConnectionSession {
    pub(crate) gatt: GattClient,
    pub(crate) smp: SmpManager,
}

impl ConnectionSession {
    /// Create the session for a new link
    pub fn new(connection: u16, local: DeviceAddress, peer: DeviceAddress, multi_role: bool) -> Self {
        Self {
            gatt: GattClient::new(connection, multi_role),
            smp: SmpManager::new(connection, local, peer),
        }
    }

    /// Connection handle
    pub fn connection(&self) -> u16 {
        self.gatt.connection()
    }

    pub fn gatt(&self) -> &GattClient {
        &self.gatt
    }

    pub fn smp(&self) -> &SmpManager {
        &self.smp
    }

    /// Feed one PDU from the ATT channel.
    ///
    /// The request refused for lack of security stays outstanding; it is
    /// not re-sent once pairing completes.
    pub fn on_att_data(&mut self, transport: &mut dyn Transport, data: &[u8]) {
        if self.gatt.handle_pdu(transport, data) == AttDispatch::SecurityRequired {
            debug!(
                "Connection 0x{:04x}: ATT request needs security, starting pairing",
                self.connection()
            );
            self.smp.handle_security_request(transport);
        }
    }

    /// Feed one PDU from the SMP channel
    pub fn on_smp_data(&mut self, transport: &mut dyn Transport, data: &[u8]) {
        self.smp.handle_smp_packet(transport, data);
    }

    /// The ATT channel closed; discard every pending transaction and the pairing attempt
    pub fn on_end_of_stream(&mut self) {
        debug!("Connection 0x{:04x}: ATT stream ended", self.connection());
        self.gatt.reset();
        self.smp.clear();
    }

    /// Link encryption changed
    pub fn on_encryption_changed(&mut self, encrypted: bool) {
        self.gatt.set_encrypted(encrypted);
    }
}
