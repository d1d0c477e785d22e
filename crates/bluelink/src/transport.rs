//! Link-layer boundary
//!
//! The engine never touches a socket. Outbound channel data and encryption
//! requests go through [`Transport`]; inbound data and connection lifecycle
//! notifications are fed to [`crate::Host`] by whoever owns the link.

/// Fixed L2CAP channel for the Attribute Protocol
pub const ATT_CID: u16 = 0x0004;
/// Fixed L2CAP channel for LE signaling (connection parameters); not handled here
pub const LE_SIGNALING_CID: u16 = 0x0005;
/// Fixed L2CAP channel for the Security Manager Protocol
pub const SMP_CID: u16 = 0x0006;

/// Outbound half of the link layer
pub trait Transport {
    /// Write one PDU on a fixed channel of a connection
    fn send_channel_data(&mut self, connection: u16, channel: u16, data: &[u8]);

    /// Ask the controller to encrypt the link with `key`
    fn start_encryption(&mut self, connection: u16, random: [u8; 8], diversifier: u16, key: [u8; 16]);
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send_channel_data(&mut self, connection: u16, channel: u16, data: &[u8]) {
        (**self).send_channel_data(connection, channel, data)
    }

    fn start_encryption(&mut self, connection: u16, random: [u8; 8], diversifier: u16, key: [u8; 16]) {
        (**self).start_encryption(connection, random, diversifier, key)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;

    /// One recorded encryption request
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct EncryptionRequest {
        pub connection: u16,
        pub random: [u8; 8],
        pub diversifier: u16,
        pub key: [u8; 16],
    }

    /// Transport that records everything written to it
    #[derive(Debug, Default)]
    pub struct MockTransport {
        pub sent: Vec<(u16, u16, Vec<u8>)>,
        pub encryption: Vec<EncryptionRequest>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// PDUs written on `channel`, oldest first
        pub fn channel(&self, channel: u16) -> Vec<Vec<u8>> {
            self.sent
                .iter()
                .filter(|(_, cid, _)| *cid == channel)
                .map(|(_, _, data)| data.clone())
                .collect()
        }

        pub fn att(&self) -> Vec<Vec<u8>> {
            self.channel(ATT_CID)
        }

        pub fn smp(&self) -> Vec<Vec<u8>> {
            self.channel(SMP_CID)
        }

        pub fn clear(&mut self) {
            self.sent.clear();
            self.encryption.clear();
        }
    }

    impl Transport for MockTransport {
        fn send_channel_data(&mut self, connection: u16, channel: u16, data: &[u8]) {
            self.sent.push((connection, channel, data.to_vec()));
        }

        fn start_encryption(&mut self, connection: u16, random: [u8; 8], diversifier: u16, key: [u8; 16]) {
            self.encryption.push(EncryptionRequest {
                connection,
                random,
                diversifier,
                key,
            });
        }
    }
}
