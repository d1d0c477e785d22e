//! LE legacy "Just Works" pairing, initiator side
//!
//! A [`PairingSession`] walks one pairing attempt from the Pairing Request
//! to the short-term key. It only computes; writing PDUs and starting
//! encryption is left to [`super::SmpManager`].

use super::constants::*;
use super::crypto::{c1, s1};
use super::types::*;
use crate::gap::DeviceAddress;
use log::debug;

/// Pairing progress of one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairingState {
    /// Nothing sent yet
    Idle,
    /// Pairing Request sent, waiting for the Pairing Response
    PairingRequested,
    /// Our confirm sent, waiting for the peer's confirm
    AwaitingConfirm,
    /// Our random sent, waiting for the peer's random
    AwaitingRandom,
    /// Peer confirm matched; STK derived
    Verified,
    /// Pairing aborted
    Failed,
}

impl PairingState {
    /// Whether a pairing exchange is under way
    pub fn in_progress(&self) -> bool {
        matches!(
            self,
            PairingState::PairingRequested
                | PairingState::AwaitingConfirm
                | PairingState::AwaitingRandom
        )
    }
}

/// State of one pairing attempt
#[derive(Debug, Clone)]
pub struct PairingSession {
    state: PairingState,
    /// Our address (initiator)
    local: DeviceAddress,
    /// Peer address (responder)
    peer: DeviceAddress,
    preq: [u8; SMP_PAIRING_PDU_LEN],
    pres: [u8; SMP_PAIRING_PDU_LEN],
    temp_key: [u8; 16],
    local_random: [u8; 16],
    peer_confirm: Option<[u8; 16]>,
}

impl PairingSession {
    /// Create a session using `local_random` as our Mrand
    pub fn new(local: DeviceAddress, peer: DeviceAddress, local_random: [u8; 16]) -> Self {
        Self {
            state: PairingState::Idle,
            local,
            peer,
            preq: PairingRequest::just_works().serialize(true),
            pres: [0u8; SMP_PAIRING_PDU_LEN],
            temp_key: SMP_JUST_WORKS_TK,
            local_random,
            peer_confirm: None,
        }
    }

    /// Current state
    pub fn state(&self) -> PairingState {
        self.state
    }

    /// Build the Pairing Request PDU and move to `PairingRequested`
    pub fn start(&mut self) -> Vec<u8> {
        self.state = PairingState::PairingRequested;
        self.preq.to_vec()
    }

    /// Handle the Pairing Response; returns our Pairing Confirm PDU
    pub fn on_pairing_response(&mut self, data: &[u8]) -> SmpResult<Vec<u8>> {
        let response = PairingRequest::parse(data)?;
        if response.requires_mitm() {
            debug!("Peer asks for MITM protection; continuing unauthenticated");
        }

        self.pres.copy_from_slice(&data[..SMP_PAIRING_PDU_LEN]);

        let confirm = PairingConfirm {
            confirm_value: self.confirm_value(&self.local_random),
        };

        self.state = PairingState::AwaitingConfirm;
        Ok(confirm.serialize())
    }

    /// Store the peer's confirm; returns our Pairing Random PDU
    pub fn on_pairing_confirm(&mut self, data: &[u8]) -> SmpResult<Vec<u8>> {
        let confirm = PairingConfirm::parse(data)?;
        self.peer_confirm = Some(confirm.confirm_value);

        let random = PairingRandom {
            random_value: self.local_random,
        };

        self.state = PairingState::AwaitingRandom;
        Ok(random.serialize())
    }

    /// Verify the peer's random against its confirm; returns the STK
    pub fn on_pairing_random(&mut self, data: &[u8]) -> SmpResult<[u8; 16]> {
        let random = PairingRandom::parse(data)?;
        let expected = self.confirm_value(&random.random_value);

        if self.peer_confirm != Some(expected) {
            self.state = PairingState::Failed;
            return Err(SmpError::ConfirmValueFailed);
        }

        self.state = PairingState::Verified;
        Ok(s1(&self.temp_key, &random.random_value, &self.local_random))
    }

    /// Abort the attempt
    pub fn fail(&mut self) {
        self.state = PairingState::Failed;
    }

    fn confirm_value(&self, random: &[u8; 16]) -> [u8; 16] {
        c1(
            &self.temp_key,
            random,
            &self.preq,
            &self.pres,
            &self.local,
            &self.peer,
        )
    }
}
