//! Security Manager Protocol manager implementation
//!
//! One manager per connection. It dispatches inbound SMP PDUs to the
//! pairing session, writes the replies and asks the transport to start
//! encryption once the peer's confirm value checks out.

use super::constants::*;
use super::crypto::generate_random_128;
use super::pairing::*;
use super::types::*;
use crate::gap::DeviceAddress;
use crate::transport::{Transport, SMP_CID};
use log::{debug, trace, warn};
use std::collections::VecDeque;

/// Source of our per-attempt random value
pub type RandomSource = fn() -> [u8; 16];

/// Security Manager Protocol manager
#[derive(Debug)]
pub struct SmpManager {
    /// Connection this manager belongs to
    connection: u16,
    /// Our address (initiator)
    local: DeviceAddress,
    /// Peer address (responder)
    peer: DeviceAddress,
    /// Active pairing attempt, created on the first trigger
    session: Option<PairingSession>,
    random_source: RandomSource,
    events: VecDeque<SmpEvent>,
}

impl SmpManager {
    /// Create a new SMP manager
    pub fn new(connection: u16, local: DeviceAddress, peer: DeviceAddress) -> Self {
        Self {
            connection,
            local,
            peer,
            session: None,
            random_source: generate_random_128,
            events: VecDeque::new(),
        }
    }

    /// Replace the generator of our pairing random
    pub fn with_random_source(mut self, random_source: RandomSource) -> Self {
        self.random_source = random_source;
        self
    }

    /// State of the current attempt, `Idle` when there is none
    pub fn state(&self) -> PairingState {
        self.session
            .as_ref()
            .map_or(PairingState::Idle, PairingSession::state)
    }

    /// Next pending event
    pub fn poll_event(&mut self) -> Option<SmpEvent> {
        self.events.pop_front()
    }

    /// Start pairing by sending a Pairing Request.
    ///
    /// Entry point for both a peer Security Request and an ATT error that
    /// asks for more security. Ignored while an attempt is under way.
    pub fn handle_security_request(&mut self, transport: &mut dyn Transport) {
        if self.state().in_progress() {
            debug!(
                "Connection 0x{:04x}: pairing already in progress ({:?})",
                self.connection,
                self.state()
            );
            return;
        }

        let mut session = PairingSession::new(self.local, self.peer, (self.random_source)());
        let request = session.start();
        self.session = Some(session);

        debug!("Connection 0x{:04x}: sending pairing request", self.connection);
        self.send_smp_packet(transport, &request);
        self.notify_event(SmpEvent::PairingStarted);
    }

    /// Handle one inbound SMP PDU
    pub fn handle_smp_packet(&mut self, transport: &mut dyn Transport, data: &[u8]) {
        trace!("Connection 0x{:04x}: SMP read {}", self.connection, hex::encode(data));

        let Some(&opcode) = data.first() else {
            warn!("Connection 0x{:04x}: empty SMP PDU", self.connection);
            return;
        };

        let result = match opcode {
            SMP_PAIRING_RESPONSE => self.handle_pairing_response(transport, data),
            SMP_PAIRING_CONFIRM => self.handle_pairing_confirm(transport, data),
            SMP_PAIRING_RANDOM => self.handle_pairing_random(transport, data),
            SMP_PAIRING_FAILED => self.handle_pairing_failed(data),
            SMP_ENCRYPTION_INFORMATION => self.handle_encryption_information(data),
            SMP_MASTER_IDENTIFICATION => self.handle_master_identification(data),
            SMP_SECURITY_REQUEST => self.handle_security_request_packet(transport, data),
            SMP_IDENTITY_INFORMATION | SMP_IDENTITY_ADDRESS_INFORMATION | SMP_SIGNING_INFORMATION => {
                debug!("Connection 0x{:04x}: ignoring key distribution 0x{:02x}", self.connection, opcode);
                Ok(())
            }
            _ => {
                debug!("Connection 0x{:04x}: ignoring SMP opcode 0x{:02x}", self.connection, opcode);
                Ok(())
            }
        };

        if let Err(err) = result {
            warn!("Connection 0x{:04x}: dropped SMP PDU: {}", self.connection, err);
        }
    }

    /// Drop the pairing attempt without telling the peer
    pub fn clear(&mut self) {
        self.session = None;
    }

    fn handle_pairing_response(&mut self, transport: &mut dyn Transport, data: &[u8]) -> SmpResult<()> {
        let session = self.expect_state(PairingState::PairingRequested, "Pairing Response")?;
        let confirm = session.on_pairing_response(data)?;

        debug!("Connection 0x{:04x}: sending pairing confirm", self.connection);
        self.send_smp_packet(transport, &confirm);
        Ok(())
    }

    fn handle_pairing_confirm(&mut self, transport: &mut dyn Transport, data: &[u8]) -> SmpResult<()> {
        let session = self.expect_state(PairingState::AwaitingConfirm, "Pairing Confirm")?;
        let random = session.on_pairing_confirm(data)?;

        debug!("Connection 0x{:04x}: sending pairing random", self.connection);
        self.send_smp_packet(transport, &random);
        Ok(())
    }

    /// Verify the peer's random. A mismatch is reported with a Pairing
    /// Failed PDU carrying reason Confirm Value Failed, `[0x05, 0x04]`,
    /// rather than the opcode pair `[0x04, 0x03]` (Pairing Random, Pairing
    /// Confirm) some hosts write in its place.
    fn handle_pairing_random(&mut self, transport: &mut dyn Transport, data: &[u8]) -> SmpResult<()> {
        let session = self.expect_state(PairingState::AwaitingRandom, "Pairing Random")?;

        match session.on_pairing_random(data) {
            Ok(stk) => {
                debug!("Connection 0x{:04x}: confirm verified, starting encryption", self.connection);
                transport.start_encryption(self.connection, SMP_STK_RAND, SMP_STK_EDIV, stk);
                self.notify_event(SmpEvent::PairingVerified);
                Ok(())
            }
            Err(SmpError::ConfirmValueFailed) => {
                warn!("Connection 0x{:04x}: peer confirm value mismatch", self.connection);
                let failed = PairingFailed {
                    reason: SMP_REASON_CONFIRM_VALUE_FAILED,
                };
                self.send_smp_packet(transport, &failed.serialize());
                self.notify_event(SmpEvent::PairingFailed(SmpError::ConfirmValueFailed));
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn handle_pairing_failed(&mut self, data: &[u8]) -> SmpResult<()> {
        let failed = PairingFailed::parse(data)?;
        let error = failed.error();

        debug!("Connection 0x{:04x}: peer aborted pairing: {}", self.connection, error);
        // Kept in `Failed` until the next trigger replaces it
        if let Some(session) = self.session.as_mut() {
            session.fail();
        }
        self.notify_event(SmpEvent::PairingFailed(error));
        Ok(())
    }

    fn handle_encryption_information(&mut self, data: &[u8]) -> SmpResult<()> {
        let info = EncryptionInformation::parse(data)?;
        self.notify_event(SmpEvent::LongTermKey(info.long_term_key));
        Ok(())
    }

    fn handle_master_identification(&mut self, data: &[u8]) -> SmpResult<()> {
        let ident = MasterIdentification::parse(data)?;
        self.notify_event(SmpEvent::MasterIdentification {
            ediv: ident.ediv,
            rand: ident.rand,
        });
        Ok(())
    }

    fn handle_security_request_packet(&mut self, transport: &mut dyn Transport, data: &[u8]) -> SmpResult<()> {
        let request = SecurityRequest::parse(data)?;
        debug!(
            "Connection 0x{:04x}: security request, auth_req 0x{:02x}",
            self.connection, request.auth_req
        );
        self.handle_security_request(transport);
        Ok(())
    }

    fn expect_state(&mut self, expected: PairingState, what: &str) -> SmpResult<&mut PairingSession> {
        match self.session.as_mut() {
            Some(session) if session.state() == expected => Ok(session),
            session => Err(SmpError::InvalidParameter(format!(
                "unexpected {} in state {:?}",
                what,
                session.map_or(PairingState::Idle, |s| s.state())
            ))),
        }
    }

    fn send_smp_packet(&self, transport: &mut dyn Transport, packet: &[u8]) {
        trace!("Connection 0x{:04x}: SMP write {}", self.connection, hex::encode(packet));
        transport.send_channel_data(self.connection, SMP_CID, packet);
    }

    fn notify_event(&mut self, event: SmpEvent) {
        self.events.push_back(event);
    }
}
