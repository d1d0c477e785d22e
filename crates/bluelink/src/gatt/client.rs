//! GATT Client implementation
//!
//! One [`GattClient`] drives the ATT bearer of one connection. Every
//! operation is queued on the connection's [`TransactionQueue`]; the
//! continuation that runs when the response arrives is a `Pending`
//! value, and operations complete by pushing a [`GattEvent`].

use crate::att::*;
use crate::gatt::types::*;
use crate::transport::{Transport, ATT_CID};
use crate::uuid::Uuid;
use log::{debug, trace, warn};
use std::collections::VecDeque;

/// What an operation reports its completion as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    /// Characteristic declaration handle
    Characteristic(u16),
    /// Descriptor handle
    Descriptor(u16),
    /// Raw attribute handle
    Handle(u16),
}

/// Which configuration descriptor a toggle works on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigKind {
    Broadcast,
    Notify,
}

impl ConfigKind {
    fn descriptor_uuid(&self) -> u16 {
        match self {
            ConfigKind::Broadcast => SERVER_CHAR_CONFIG_UUID,
            ConfigKind::Notify => CLIENT_CHAR_CONFIG_UUID,
        }
    }
}

/// Continuation of a request awaiting its response
#[derive(Debug)]
enum Pending {
    ExchangeMtu {
        requested: u16,
    },
    Services {
        filter: Vec<Uuid>,
        found: Vec<Service>,
    },
    IncludedServices {
        service: Service,
        filter: Vec<Uuid>,
        found: Vec<IncludedService>,
    },
    Characteristics {
        service: Service,
        filter: Vec<Uuid>,
        found: Vec<Characteristic>,
    },
    Descriptors {
        characteristic: Characteristic,
        filter: Vec<Uuid>,
        found: Vec<Descriptor>,
    },
    Read {
        target: Target,
        handle: u16,
        value: Vec<u8>,
    },
    Write {
        target: Target,
    },
    PrepareWrite {
        handle: u16,
        offset: u16,
        chunk: Vec<u8>,
    },
    ExecuteWrite {
        target: Target,
        report: bool,
    },
    ConfigRead {
        kind: ConfigKind,
        characteristic: Characteristic,
        enable: bool,
    },
    ConfigWrite {
        kind: ConfigKind,
        characteristic_handle: u16,
        enable: bool,
    },
}

/// Continuation of a PDU that expects no response
#[derive(Debug, PartialEq, Eq)]
enum Sent {
    Write { target: Target },
    Confirmation { handle: u16 },
}

/// Outcome of feeding one inbound ATT PDU to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttDispatch {
    /// Fully handled by the client
    Handled,
    /// The peer refused the outstanding request for lack of security; the
    /// request stays outstanding and pairing should start
    SecurityRequired,
}

/// GATT client for one connection
#[derive(Debug)]
pub struct GattClient {
    connection: u16,
    mtu: u16,
    security: SecurityLevel,
    multi_role: bool,
    queue: TransactionQueue<Pending, Sent>,
    database: AttributeDatabase,
    events: VecDeque<GattEvent>,
}

fn matches_filter(filter: &[Uuid], uuid: &Uuid) -> bool {
    filter.is_empty() || filter.contains(uuid)
}

fn error_from_response(data: &[u8]) -> AttError {
    match ErrorResponse::parse(data) {
        Ok(response) => response.to_error(),
        Err(_) => AttError::UnexpectedResponse(data.first().copied().unwrap_or_default()),
    }
}

fn error_code_from_response(data: &[u8]) -> Option<AttErrorCode> {
    ErrorResponse::parse(data).ok().map(|response| response.error_code)
}

impl GattClient {
    /// Create a client for a freshly established connection
    pub fn new(connection: u16, multi_role: bool) -> Self {
        Self {
            connection,
            mtu: ATT_DEFAULT_MTU,
            security: SecurityLevel::Low,
            multi_role,
            queue: TransactionQueue::new(),
            database: AttributeDatabase::new(),
            events: VecDeque::new(),
        }
    }

    /// Connection handle this client talks on
    pub fn connection(&self) -> u16 {
        self.connection
    }

    /// MTU currently in force
    pub fn mtu(&self) -> u16 {
        self.mtu
    }

    pub fn security(&self) -> SecurityLevel {
        self.security
    }

    /// Attributes discovered so far
    pub fn database(&self) -> &AttributeDatabase {
        &self.database
    }

    /// Whether a request is awaiting its response
    pub fn is_outstanding(&self) -> bool {
        self.queue.is_outstanding()
    }

    /// Next pending event
    pub fn poll_event(&mut self) -> Option<GattEvent> {
        self.events.pop_front()
    }

    /// Record a link encryption change; security never drops back to low
    pub fn set_encrypted(&mut self, encrypted: bool) {
        if encrypted && self.security < SecurityLevel::Medium {
            debug!("Connection 0x{:04x}: security raised to medium", self.connection);
            self.security = SecurityLevel::Medium;
        }
    }

    /// Drop every queued and outstanding transaction
    pub fn reset(&mut self) {
        if self.queue.is_outstanding() || !self.queue.is_empty() {
            debug!(
                "Connection 0x{:04x}: discarding {} queued transaction(s)",
                self.connection,
                self.queue.len() + usize::from(self.queue.is_outstanding())
            );
        }
        self.queue.clear();
    }

    /// Negotiate a larger MTU
    pub fn exchange_mtu(&mut self, transport: &mut dyn Transport, mtu: u16) -> AttResult<()> {
        if mtu < ATT_DEFAULT_MTU {
            return Err(AttError::InvalidParameter(format!(
                "MTU {} is below the minimum of {}",
                mtu, ATT_DEFAULT_MTU
            )));
        }

        let request = ExchangeMtuRequest { client_mtu: mtu };
        self.queue_command(
            transport,
            request.serialize(),
            Some(Pending::ExchangeMtu { requested: mtu }),
            None,
        );
        Ok(())
    }

    /// Discover all primary services, reporting those in `filter` (all when empty)
    pub fn discover_services(&mut self, transport: &mut dyn Transport, filter: &[Uuid]) -> AttResult<()> {
        self.queue_command(
            transport,
            Self::services_request(ATT_HANDLE_MIN),
            Some(Pending::Services {
                filter: filter.to_vec(),
                found: Vec::new(),
            }),
            None,
        );
        Ok(())
    }

    /// Discover the include declarations of the service at `service_handle`
    pub fn discover_included_services(
        &mut self,
        transport: &mut dyn Transport,
        service_handle: u16,
        filter: &[Uuid],
    ) -> AttResult<()> {
        let Some(service) = self.lookup_service(service_handle) else {
            return Ok(());
        };

        let request = Self::by_type_request(service.start_handle, service.end_handle, INCLUDE_UUID);
        self.queue_command(
            transport,
            request,
            Some(Pending::IncludedServices {
                service,
                filter: filter.to_vec(),
                found: Vec::new(),
            }),
            None,
        );
        Ok(())
    }

    /// Discover the characteristics of the service at `service_handle`
    pub fn discover_characteristics(
        &mut self,
        transport: &mut dyn Transport,
        service_handle: u16,
        filter: &[Uuid],
    ) -> AttResult<()> {
        let Some(service) = self.lookup_service(service_handle) else {
            return Ok(());
        };

        let request =
            Self::by_type_request(service.start_handle, service.end_handle, CHARACTERISTIC_UUID);
        self.queue_command(
            transport,
            request,
            Some(Pending::Characteristics {
                service,
                filter: filter.to_vec(),
                found: Vec::new(),
            }),
            None,
        );
        Ok(())
    }

    /// Discover the descriptors of the characteristic at `characteristic_handle`
    pub fn discover_descriptors(
        &mut self,
        transport: &mut dyn Transport,
        characteristic_handle: u16,
        filter: &[Uuid],
    ) -> AttResult<()> {
        let Some(characteristic) = self.lookup_characteristic(characteristic_handle) else {
            return Ok(());
        };

        if !characteristic.has_descriptor_range() {
            self.events.push_back(GattEvent::DescriptorsDiscovered {
                characteristic_handle,
                descriptors: Vec::new(),
            });
            return Ok(());
        }

        let request = FindInformationRequest {
            start_handle: characteristic.value_handle + 1,
            end_handle: characteristic.end_handle,
        };
        self.queue_command(
            transport,
            request.serialize(),
            Some(Pending::Descriptors {
                characteristic,
                filter: filter.to_vec(),
                found: Vec::new(),
            }),
            None,
        );
        Ok(())
    }

    /// Read a characteristic value
    pub fn read(&mut self, transport: &mut dyn Transport, characteristic_handle: u16) -> AttResult<()> {
        let Some(characteristic) = self.lookup_characteristic(characteristic_handle) else {
            return Ok(());
        };

        self.read_target(
            transport,
            Target::Characteristic(characteristic_handle),
            characteristic.value_handle,
        );
        Ok(())
    }

    /// Write a characteristic value
    pub fn write(
        &mut self,
        transport: &mut dyn Transport,
        characteristic_handle: u16,
        data: &[u8],
        without_response: bool,
    ) -> AttResult<()> {
        let Some(characteristic) = self.lookup_characteristic(characteristic_handle) else {
            return Ok(());
        };

        self.write_target(
            transport,
            Target::Characteristic(characteristic_handle),
            characteristic.value_handle,
            data,
            without_response,
        )
    }

    /// Write a characteristic value with Prepare/Execute Write regardless of its length
    pub fn long_write(
        &mut self,
        transport: &mut dyn Transport,
        characteristic_handle: u16,
        data: &[u8],
        without_response: bool,
        execute: ExecuteWrite,
    ) -> AttResult<()> {
        let Some(characteristic) = self.lookup_characteristic(characteristic_handle) else {
            return Ok(());
        };

        self.long_write_target(
            transport,
            Target::Characteristic(characteristic_handle),
            characteristic.value_handle,
            data,
            without_response,
            execute,
        )
    }

    /// Read a descriptor value
    pub fn read_descriptor(&mut self, transport: &mut dyn Transport, descriptor_handle: u16) -> AttResult<()> {
        let Some(descriptor) = self.lookup_descriptor(descriptor_handle) else {
            return Ok(());
        };

        self.read_target(transport, Target::Descriptor(descriptor.handle), descriptor.handle);
        Ok(())
    }

    /// Write a descriptor value; always acknowledged
    pub fn write_descriptor(
        &mut self,
        transport: &mut dyn Transport,
        descriptor_handle: u16,
        data: &[u8],
    ) -> AttResult<()> {
        let Some(descriptor) = self.lookup_descriptor(descriptor_handle) else {
            return Ok(());
        };

        self.write_target(
            transport,
            Target::Descriptor(descriptor.handle),
            descriptor.handle,
            data,
            false,
        )
    }

    /// Read any attribute by handle, following up with Read Blob while the value is truncated
    pub fn read_handle(&mut self, transport: &mut dyn Transport, handle: u16) -> AttResult<()> {
        self.read_target(transport, Target::Handle(handle), handle);
        Ok(())
    }

    /// Write any attribute by handle
    pub fn write_handle(
        &mut self,
        transport: &mut dyn Transport,
        handle: u16,
        data: &[u8],
        without_response: bool,
    ) -> AttResult<()> {
        self.write_target(transport, Target::Handle(handle), handle, data, without_response)
    }

    /// Write any attribute by handle with Prepare/Execute Write
    pub fn long_write_handle(
        &mut self,
        transport: &mut dyn Transport,
        handle: u16,
        data: &[u8],
        without_response: bool,
        execute: ExecuteWrite,
    ) -> AttResult<()> {
        self.long_write_target(
            transport,
            Target::Handle(handle),
            handle,
            data,
            without_response,
            execute,
        )
    }

    /// Set or clear the broadcast bit of the server configuration descriptor
    pub fn broadcast(
        &mut self,
        transport: &mut dyn Transport,
        characteristic_handle: u16,
        enable: bool,
    ) -> AttResult<()> {
        self.toggle_config(transport, ConfigKind::Broadcast, characteristic_handle, enable)
    }

    /// Subscribe to or unsubscribe from notifications (or indications)
    pub fn notify(
        &mut self,
        transport: &mut dyn Transport,
        characteristic_handle: u16,
        enable: bool,
    ) -> AttResult<()> {
        self.toggle_config(transport, ConfigKind::Notify, characteristic_handle, enable)
    }

    /// Feed one inbound PDU received on the ATT channel
    pub fn handle_pdu(&mut self, transport: &mut dyn Transport, data: &[u8]) -> AttDispatch {
        let Some(opcode) = pdu_opcode(data) else {
            warn!("Connection 0x{:04x}: empty ATT PDU", self.connection);
            return AttDispatch::Handled;
        };
        trace!("Connection 0x{:04x}: ATT read {}", self.connection, hex::encode(data));

        if self.queue.is_echo(data) {
            debug!("Connection 0x{:04x}: ignoring echo of our last PDU", self.connection);
            return AttDispatch::Handled;
        }

        if is_peer_request(opcode) {
            self.refuse_peer_request(transport, opcode);
            return AttDispatch::Handled;
        }

        if is_peer_originated(opcode) {
            debug!(
                "Connection 0x{:04x}: ignoring peer command 0x{:02x}",
                self.connection, opcode
            );
            return AttDispatch::Handled;
        }

        if opcode == ATT_HANDLE_VALUE_NTF || opcode == ATT_HANDLE_VALUE_IND {
            self.handle_value(transport, opcode, data);
            return AttDispatch::Handled;
        }

        if !self.queue.is_outstanding() {
            warn!(
                "Connection 0x{:04x}: response 0x{:02x} with no outstanding request",
                self.connection, opcode
            );
            return AttDispatch::Handled;
        }

        if opcode == ATT_ERROR_RSP && self.security < SecurityLevel::Medium {
            if let Ok(error) = ErrorResponse::parse(data) {
                if error.error_code.is_security_related() {
                    debug!(
                        "Connection 0x{:04x}: {:?} on handle 0x{:04x}, escalating to pairing",
                        self.connection, error.error_code, error.handle
                    );
                    return AttDispatch::SecurityRequired;
                }
            }
        }

        if let Some(pending) = self.queue.take_current() {
            self.on_response(transport, pending, data);
        }
        let flushed = self.queue.drain();
        self.flush(transport, flushed);

        AttDispatch::Handled
    }

    fn refuse_peer_request(&mut self, transport: &mut dyn Transport, opcode: u8) {
        if self.multi_role {
            debug!(
                "Connection 0x{:04x}: multi-role, ignoring request 0x{:02x} meant for our server",
                self.connection, opcode
            );
            return;
        }

        debug!(
            "Connection 0x{:04x}: replying request-not-supported to 0x{:02x}",
            self.connection, opcode
        );
        let response = ErrorResponse::new(opcode, 0x0000, AttErrorCode::RequestNotSupported);
        self.write_att(transport, &response.serialize());
    }

    fn handle_value(&mut self, transport: &mut dyn Transport, opcode: u8, data: &[u8]) {
        let indication = opcode == ATT_HANDLE_VALUE_IND;
        let parsed = if indication {
            HandleValueIndication::parse(data).map(|pdu| (pdu.handle, pdu.value))
        } else {
            HandleValueNotification::parse(data).map(|pdu| (pdu.handle, pdu.value))
        };

        let (handle, value) = match parsed {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!("Connection 0x{:04x}: bad handle value PDU: {}", self.connection, err);
                return;
            }
        };

        let characteristic_handle = self
            .database
            .characteristic_by_value_handle(handle)
            .map(|characteristic| characteristic.start_handle);

        self.events.push_back(GattEvent::Notification {
            handle,
            characteristic_handle,
            value,
            indication,
        });

        if indication {
            self.queue_command(
                transport,
                HandleValueConfirmation.serialize(),
                None,
                Some(Sent::Confirmation { handle }),
            );
        }
    }

    fn on_response(&mut self, transport: &mut dyn Transport, pending: Pending, data: &[u8]) {
        match pending {
            Pending::ExchangeMtu { requested } => self.on_exchange_mtu(requested, data),
            Pending::Services { filter, found } => self.on_services(transport, filter, found, data),
            Pending::IncludedServices {
                service,
                filter,
                found,
            } => self.on_included_services(transport, service, filter, found, data),
            Pending::Characteristics {
                service,
                filter,
                found,
            } => self.on_characteristics(transport, service, filter, found, data),
            Pending::Descriptors {
                characteristic,
                filter,
                found,
            } => self.on_descriptors(transport, characteristic, filter, found, data),
            Pending::Read {
                target,
                handle,
                value,
            } => self.on_read(transport, target, handle, value, data),
            Pending::Write { target } => {
                let result = if data[0] == ATT_WRITE_RSP {
                    Ok(())
                } else {
                    Err(error_from_response(data))
                };
                self.complete_write(target, result);
            }
            Pending::PrepareWrite {
                handle,
                offset,
                chunk,
            } => self.on_prepare_write(handle, offset, &chunk, data),
            Pending::ExecuteWrite { target, report } => {
                if !report {
                    return;
                }
                let result = if data[0] == ATT_EXECUTE_WRITE_RSP {
                    Ok(())
                } else {
                    Err(error_from_response(data))
                };
                self.complete_write(target, result);
            }
            Pending::ConfigRead {
                kind,
                characteristic,
                enable,
            } => self.on_config_read(transport, kind, characteristic, enable, data),
            Pending::ConfigWrite {
                kind,
                characteristic_handle,
                enable,
            } => {
                let result = if data[0] == ATT_WRITE_RSP {
                    Ok(enable)
                } else {
                    Err(error_from_response(data))
                };
                self.events.push_back(match kind {
                    ConfigKind::Broadcast => GattEvent::BroadcastChanged {
                        characteristic_handle,
                        result,
                    },
                    ConfigKind::Notify => GattEvent::NotifyChanged {
                        characteristic_handle,
                        result,
                    },
                });
            }
        }
    }

    fn on_sent(&mut self, sent: Sent) {
        match sent {
            Sent::Write { target } => self.complete_write(target, Ok(())),
            Sent::Confirmation { handle } => {
                self.events.push_back(GattEvent::IndicationConfirmed { handle })
            }
        }
    }

    fn on_exchange_mtu(&mut self, requested: u16, data: &[u8]) {
        match ExchangeMtuResponse::parse(data) {
            Ok(response) => {
                self.mtu = requested.min(response.server_mtu).max(ATT_DEFAULT_MTU);
                debug!("Connection 0x{:04x}: new MTU is {}", self.connection, self.mtu);
            }
            Err(_) => debug!(
                "Connection 0x{:04x}: MTU exchange refused, keeping {}",
                self.connection, self.mtu
            ),
        }

        self.events.push_back(GattEvent::MtuChanged { mtu: self.mtu });
    }

    fn on_services(
        &mut self,
        transport: &mut dyn Transport,
        filter: Vec<Uuid>,
        mut found: Vec<Service>,
        data: &[u8],
    ) {
        let before = found.len();
        let page = match ReadByGroupTypeResponse::parse(data) {
            Ok(response) => response.data,
            Err(_) => Vec::new(),
        };

        for entry in page {
            match Uuid::try_from_slice_le(&entry.value) {
                Some(uuid) => found.push(Service {
                    uuid,
                    start_handle: entry.handle,
                    end_handle: entry.end_group_handle,
                }),
                None => warn!("Connection 0x{:04x}: bad service UUID length", self.connection),
            }
        }

        let next = match found[before..].last() {
            Some(last) if last.end_handle != ATT_HANDLE_MAX => {
                Some(last.end_handle + 1)
            }
            _ => None,
        };

        if let Some(start_handle) = next {
            self.queue_command(
                transport,
                Self::services_request(start_handle),
                Some(Pending::Services { filter, found }),
                None,
            );
            return;
        }

        for service in &found {
            self.database.insert(Attribute::Service(service.clone()));
        }
        let services = found
            .into_iter()
            .filter(|service| matches_filter(&filter, &service.uuid))
            .collect();

        self.events.push_back(GattEvent::ServicesDiscovered { services });
    }

    fn on_included_services(
        &mut self,
        transport: &mut dyn Transport,
        service: Service,
        filter: Vec<Uuid>,
        mut found: Vec<IncludedService>,
        data: &[u8],
    ) {
        let before = found.len();
        let page = match ReadByTypeResponse::parse(data) {
            Ok(response) => response.data,
            Err(_) => Vec::new(),
        };

        for entry in page {
            if entry.value.len() < 4 {
                warn!("Connection 0x{:04x}: short include declaration", self.connection);
                continue;
            }
            found.push(IncludedService {
                declaration_handle: entry.handle,
                start_handle: u16::from_le_bytes([entry.value[0], entry.value[1]]),
                end_handle: u16::from_le_bytes([entry.value[2], entry.value[3]]),
                uuid: Uuid::try_from_slice_le(&entry.value[4..]),
            });
        }

        let next = match found[before..].last() {
            Some(last) if last.declaration_handle < service.end_handle => {
                Some(last.declaration_handle + 1)
            }
            _ => None,
        };

        if let Some(start_handle) = next {
            let request = Self::by_type_request(start_handle, service.end_handle, INCLUDE_UUID);
            self.queue_command(
                transport,
                request,
                Some(Pending::IncludedServices {
                    service,
                    filter,
                    found,
                }),
                None,
            );
            return;
        }

        for include in &found {
            self.database.insert(Attribute::IncludedService(include.clone()));
        }
        let included = found
            .into_iter()
            .filter(|include| match &include.uuid {
                Some(uuid) => matches_filter(&filter, uuid),
                None => filter.is_empty(),
            })
            .collect();

        self.events.push_back(GattEvent::IncludedServicesDiscovered {
            service_handle: service.start_handle,
            included,
        });
    }

    fn on_characteristics(
        &mut self,
        transport: &mut dyn Transport,
        service: Service,
        filter: Vec<Uuid>,
        mut found: Vec<Characteristic>,
        data: &[u8],
    ) {
        let before = found.len();
        let page = match ReadByTypeResponse::parse(data) {
            Ok(response) => response.data,
            Err(_) => Vec::new(),
        };

        for entry in page {
            let uuid = entry
                .value
                .get(3..)
                .and_then(Uuid::try_from_slice_le);
            let Some(uuid) = uuid else {
                warn!("Connection 0x{:04x}: bad characteristic declaration", self.connection);
                continue;
            };

            found.push(Characteristic {
                uuid,
                start_handle: entry.handle,
                end_handle: service.end_handle,
                value_handle: u16::from_le_bytes([entry.value[1], entry.value[2]]),
                properties: CharacteristicProperties::from_bits_truncate(entry.value[0]),
            });
        }

        let next = match found[before..].last() {
            Some(last)
                if u32::from(last.value_handle) + 1 < u32::from(service.end_handle) =>
            {
                Some(last.value_handle + 1)
            }
            _ => None,
        };

        if let Some(start_handle) = next {
            let request =
                Self::by_type_request(start_handle, service.end_handle, CHARACTERISTIC_UUID);
            self.queue_command(
                transport,
                request,
                Some(Pending::Characteristics {
                    service,
                    filter,
                    found,
                }),
                None,
            );
            return;
        }

        // Each characteristic ends right before the next declaration
        let next_starts: Vec<u16> = found.iter().skip(1).map(|c| c.start_handle).collect();
        for (characteristic, next_start) in found.iter_mut().zip(next_starts) {
            characteristic.end_handle = next_start.saturating_sub(1);
        }
        if let Some(last) = found.last_mut() {
            last.end_handle = service.end_handle;
        }

        for characteristic in &found {
            self.database.insert(Attribute::Characteristic(characteristic.clone()));
        }
        let characteristics = found
            .into_iter()
            .filter(|characteristic| matches_filter(&filter, &characteristic.uuid))
            .collect();

        self.events.push_back(GattEvent::CharacteristicsDiscovered {
            service_handle: service.start_handle,
            characteristics,
        });
    }

    fn on_descriptors(
        &mut self,
        transport: &mut dyn Transport,
        characteristic: Characteristic,
        filter: Vec<Uuid>,
        mut found: Vec<Descriptor>,
        data: &[u8],
    ) {
        let before = found.len();
        let page = match FindInformationResponse::parse(data) {
            Ok(response) => response.information_data,
            Err(_) => Vec::new(),
        };

        found.extend(
            page.into_iter()
                .map(|(handle, uuid)| Descriptor { handle, uuid }),
        );

        let next = match found[before..].last() {
            Some(last) if last.handle < characteristic.end_handle => {
                Some(last.handle + 1)
            }
            _ => None,
        };

        if let Some(start_handle) = next {
            let request = FindInformationRequest {
                start_handle,
                end_handle: characteristic.end_handle,
            };
            self.queue_command(
                transport,
                request.serialize(),
                Some(Pending::Descriptors {
                    characteristic,
                    filter,
                    found,
                }),
                None,
            );
            return;
        }

        for descriptor in &found {
            self.database.insert(Attribute::Descriptor(descriptor.clone()));
        }
        let descriptors = found
            .into_iter()
            .filter(|descriptor| matches_filter(&filter, &descriptor.uuid))
            .collect();

        self.events.push_back(GattEvent::DescriptorsDiscovered {
            characteristic_handle: characteristic.start_handle,
            descriptors,
        });
    }

    fn on_read(
        &mut self,
        transport: &mut dyn Transport,
        target: Target,
        handle: u16,
        mut value: Vec<u8>,
        data: &[u8],
    ) {
        let opcode = data[0];
        if opcode != ATT_READ_RSP && opcode != ATT_READ_BLOB_RSP {
            self.complete_read(target, value, error_code_from_response(data));
            return;
        }

        value.extend_from_slice(&data[1..]);

        // A response filling the whole MTU may have been cut short
        let truncated = data.len() >= usize::from(self.mtu);
        match u16::try_from(value.len()) {
            Ok(offset) if truncated => {
                let request = ReadBlobRequest { handle, offset };
                self.queue_command(
                    transport,
                    request.serialize(),
                    Some(Pending::Read {
                        target,
                        handle,
                        value,
                    }),
                    None,
                );
            }
            _ => self.complete_read(target, value, None),
        }
    }

    fn on_prepare_write(&mut self, handle: u16, offset: u16, chunk: &[u8], data: &[u8]) {
        match PrepareWriteResponse::parse(data) {
            Ok(echo) if echo.handle == handle && echo.offset == offset && echo.value == chunk => {}
            Ok(echo) => warn!(
                "Connection 0x{:04x}: prepare write echo mismatch at offset {} (got handle 0x{:04x} offset {} len {})",
                self.connection,
                offset,
                echo.handle,
                echo.offset,
                echo.value.len()
            ),
            Err(_) => warn!(
                "Connection 0x{:04x}: prepare write at offset {} failed: {}",
                self.connection,
                offset,
                error_from_response(data)
            ),
        }
    }

    fn on_config_read(
        &mut self,
        transport: &mut dyn Transport,
        kind: ConfigKind,
        characteristic: Characteristic,
        enable: bool,
        data: &[u8],
    ) {
        let characteristic_handle = characteristic.start_handle;
        let entry = ReadByTypeResponse::parse(data)
            .ok()
            .and_then(|response| response.data.into_iter().find(|entry| entry.value.len() >= 2));

        let Some(entry) = entry else {
            let error = if data[0] == ATT_ERROR_RSP {
                error_from_response(data)
            } else {
                AttError::DescriptorNotFound(characteristic_handle)
            };
            self.events.push_back(match kind {
                ConfigKind::Broadcast => GattEvent::BroadcastChanged {
                    characteristic_handle,
                    result: Err(error),
                },
                ConfigKind::Notify => GattEvent::NotifyChanged {
                    characteristic_handle,
                    result: Err(error),
                },
            });
            return;
        };

        let current = u16::from_le_bytes([entry.value[0], entry.value[1]]);
        let bit = match kind {
            ConfigKind::Broadcast => SCCD_BROADCAST,
            ConfigKind::Notify if characteristic.properties.can_notify() => CCCD_NOTIFY,
            ConfigKind::Notify if characteristic.properties.can_indicate() => CCCD_INDICATE,
            ConfigKind::Notify => 0,
        };
        let value = if enable { current | bit } else { current & !bit };

        debug!(
            "Connection 0x{:04x}: configuration 0x{:04x} -> 0x{:04x} at handle 0x{:04x}",
            self.connection, current, value, entry.handle
        );

        let request = WriteRequest {
            handle: entry.handle,
            value: value.to_le_bytes().to_vec(),
        };
        self.queue_command(
            transport,
            request.serialize(),
            Some(Pending::ConfigWrite {
                kind,
                characteristic_handle,
                enable,
            }),
            None,
        );
    }

    fn complete_read(&mut self, target: Target, value: Vec<u8>, error: Option<AttErrorCode>) {
        self.events.push_back(match target {
            Target::Characteristic(characteristic_handle) => GattEvent::Read {
                characteristic_handle,
                value,
                error,
            },
            Target::Descriptor(handle) => GattEvent::DescriptorRead {
                handle,
                value,
                error,
            },
            Target::Handle(handle) => GattEvent::HandleRead {
                handle,
                value,
                error,
            },
        });
    }

    fn complete_write(&mut self, target: Target, result: AttResult<()>) {
        self.events.push_back(match target {
            Target::Characteristic(characteristic_handle) => GattEvent::Written {
                characteristic_handle,
                result,
            },
            Target::Descriptor(handle) => GattEvent::DescriptorWritten { handle, result },
            Target::Handle(handle) => GattEvent::HandleWritten { handle, result },
        });
    }

    fn read_target(&mut self, transport: &mut dyn Transport, target: Target, handle: u16) {
        let request = ReadRequest { handle };
        self.queue_command(
            transport,
            request.serialize(),
            Some(Pending::Read {
                target,
                handle,
                value: Vec::new(),
            }),
            None,
        );
    }

    fn write_target(
        &mut self,
        transport: &mut dyn Transport,
        target: Target,
        handle: u16,
        data: &[u8],
        without_response: bool,
    ) -> AttResult<()> {
        if data.len() > ATT_MAX_VALUE_LEN {
            return Err(AttError::InvalidAttributeValueLength(data.len()));
        }

        let fits = data.len() + ATT_WRITE_HEADER_SIZE <= usize::from(self.mtu);

        if without_response {
            if !fits {
                return Err(AttError::InvalidAttributeValueLength(data.len()));
            }
            let command = WriteCommand {
                handle,
                value: data.to_vec(),
            };
            self.queue_command(transport, command.serialize(), None, Some(Sent::Write { target }));
            return Ok(());
        }

        if !fits {
            return self.long_write_target(transport, target, handle, data, false, ExecuteWrite::Commit);
        }

        let request = WriteRequest {
            handle,
            value: data.to_vec(),
        };
        self.queue_command(transport, request.serialize(), Some(Pending::Write { target }), None);
        Ok(())
    }

    fn long_write_target(
        &mut self,
        transport: &mut dyn Transport,
        target: Target,
        handle: u16,
        data: &[u8],
        without_response: bool,
        execute: ExecuteWrite,
    ) -> AttResult<()> {
        if data.len() > ATT_MAX_VALUE_LEN {
            return Err(AttError::InvalidAttributeValueLength(data.len()));
        }

        let limit = usize::from(self.mtu) - ATT_PREPARE_WRITE_HEADER_SIZE;

        for (index, chunk) in data.chunks(limit).enumerate() {
            // Bounded by ATT_MAX_VALUE_LEN
            let offset = (index * limit) as u16;
            let request = PrepareWriteRequest {
                handle,
                offset,
                value: chunk.to_vec(),
            };
            self.queue_command(
                transport,
                request.serialize(),
                Some(Pending::PrepareWrite {
                    handle,
                    offset,
                    chunk: chunk.to_vec(),
                }),
                None,
            );
        }

        let request = ExecuteWriteRequest { execute };
        self.queue_command(
            transport,
            request.serialize(),
            Some(Pending::ExecuteWrite {
                target,
                report: !without_response,
            }),
            None,
        );
        Ok(())
    }

    fn toggle_config(
        &mut self,
        transport: &mut dyn Transport,
        kind: ConfigKind,
        characteristic_handle: u16,
        enable: bool,
    ) -> AttResult<()> {
        let Some(characteristic) = self.lookup_characteristic(characteristic_handle) else {
            return Ok(());
        };

        let request = Self::by_type_request(
            characteristic.start_handle,
            characteristic.end_handle,
            kind.descriptor_uuid(),
        );
        self.queue_command(
            transport,
            request,
            Some(Pending::ConfigRead {
                kind,
                characteristic,
                enable,
            }),
            None,
        );
        Ok(())
    }

    fn lookup_service(&self, handle: u16) -> Option<Service> {
        let service = self.database.service(handle).cloned();
        if service.is_none() {
            warn!("Connection 0x{:04x}: no service at handle 0x{:04x}", self.connection, handle);
        }
        service
    }

    fn lookup_characteristic(&self, handle: u16) -> Option<Characteristic> {
        let characteristic = self.database.characteristic(handle).cloned();
        if characteristic.is_none() {
            warn!(
                "Connection 0x{:04x}: no characteristic at handle 0x{:04x}",
                self.connection, handle
            );
        }
        characteristic
    }

    fn lookup_descriptor(&self, handle: u16) -> Option<Descriptor> {
        let descriptor = self.database.descriptor(handle).cloned();
        if descriptor.is_none() {
            warn!("Connection 0x{:04x}: no descriptor at handle 0x{:04x}", self.connection, handle);
        }
        descriptor
    }

    fn services_request(start_handle: u16) -> Vec<u8> {
        ReadByGroupTypeRequest {
            start_handle,
            end_handle: ATT_HANDLE_MAX,
            group_type: Uuid::from_u16(PRIMARY_SERVICE_UUID),
        }
        .serialize()
    }

    fn by_type_request(start_handle: u16, end_handle: u16, attribute_type: u16) -> Vec<u8> {
        ReadByTypeRequest {
            start_handle,
            end_handle,
            attribute_type: Uuid::from_u16(attribute_type),
        }
        .serialize()
    }

    fn queue_command(
        &mut self,
        transport: &mut dyn Transport,
        pdu: Vec<u8>,
        on_response: Option<Pending>,
        on_sent: Option<Sent>,
    ) {
        let flushed = self.queue.enqueue(pdu, on_response, on_sent);
        self.flush(transport, flushed);
    }

    fn flush(&mut self, transport: &mut dyn Transport, flushed: Vec<Flushed<Sent>>) {
        for entry in flushed {
            self.write_att(transport, &entry.pdu);
            if let Some(sent) = entry.on_sent {
                self.on_sent(sent);
            }
        }
    }

    fn write_att(&self, transport: &mut dyn Transport, pdu: &[u8]) {
        trace!("Connection 0x{:04x}: ATT write {}", self.connection, hex::encode(pdu));
        transport.send_channel_data(self.connection, ATT_CID, pdu);
    }
}
