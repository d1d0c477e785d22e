//! Unit tests for GATT functionality

use crate::att::*;
use crate::gatt::client::{AttDispatch, GattClient};
use crate::gatt::types::*;
use crate::transport::mock::MockTransport;
use crate::uuid::Uuid;

const CONN: u16 = 0x0040;

fn error_rsp(request: u8, handle: u16, code: u8) -> Vec<u8> {
    let mut pdu = vec![ATT_ERROR_RSP, request];
    pdu.extend_from_slice(&handle.to_le_bytes());
    pdu.push(code);
    pdu
}

fn events(client: &mut GattClient) -> Vec<GattEvent> {
    std::iter::from_fn(|| client.poll_event()).collect()
}

/// Client with one service 0x0001..=0x0008 holding one characteristic
/// declared at 0x0002 with its value at 0x0003
fn client_with_characteristic(properties: u8) -> (GattClient, MockTransport) {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.discover_services(&mut transport, &[]).unwrap();
    client.handle_pdu(
        &mut transport,
        &[0x11, 0x06, 0x01, 0x00, 0x08, 0x00, 0x0D, 0x18],
    );
    client.handle_pdu(&mut transport, &error_rsp(ATT_READ_BY_GROUP_TYPE_REQ, 0x0009, 0x0A));

    client.discover_characteristics(&mut transport, 0x0001, &[]).unwrap();
    client.handle_pdu(
        &mut transport,
        &[0x09, 0x07, 0x02, 0x00, properties, 0x03, 0x00, 0x37, 0x2A],
    );
    client.handle_pdu(&mut transport, &error_rsp(ATT_READ_BY_TYPE_REQ, 0x0004, 0x0A));

    events(&mut client);
    transport.clear();
    (client, transport)
}

#[test]
fn test_service_discovery_paginates() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.discover_services(&mut transport, &[]).unwrap();
    assert_eq!(
        transport.att(),
        vec![vec![0x10, 0x01, 0x00, 0xFF, 0xFF, 0x00, 0x28]]
    );

    // First page ends at 0x0010
    client.handle_pdu(&mut transport, &[0x11, 0x06, 0x01, 0x00, 0x10, 0x00, 0x00, 0x18]);
    assert_eq!(transport.att().len(), 2);
    assert_eq!(transport.att()[1], vec![0x10, 0x11, 0x00, 0xFF, 0xFF, 0x00, 0x28]);

    // Second page reaches the end of the handle space
    client.handle_pdu(&mut transport, &[0x11, 0x06, 0x11, 0x00, 0xFF, 0xFF, 0x0D, 0x18]);
    assert_eq!(transport.att().len(), 2);
    assert!(!client.is_outstanding());

    assert_eq!(
        events(&mut client),
        vec![GattEvent::ServicesDiscovered {
            services: vec![
                Service {
                    uuid: Uuid::from_u16(0x1800),
                    start_handle: 0x0001,
                    end_handle: 0x0010,
                },
                Service {
                    uuid: Uuid::from_u16(0x180D),
                    start_handle: 0x0011,
                    end_handle: 0xFFFF,
                },
            ]
        }]
    );
}

#[test]
fn test_service_filter_registers_everything() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client
        .discover_services(&mut transport, &[Uuid::from_u16(0x180D)])
        .unwrap();
    client.handle_pdu(&mut transport, &[0x11, 0x06, 0x01, 0x00, 0x05, 0x00, 0x00, 0x18]);
    client.handle_pdu(&mut transport, &error_rsp(ATT_READ_BY_GROUP_TYPE_REQ, 0x0006, 0x0A));

    match events(&mut client).as_slice() {
        [GattEvent::ServicesDiscovered { services }] => assert!(services.is_empty()),
        other => panic!("unexpected events {:?}", other),
    }

    // Filtered out of the result, still known by handle
    assert!(client.database().service(0x0001).is_some());
}

#[test]
fn test_characteristic_discovery_derives_end_handles() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.discover_services(&mut transport, &[]).unwrap();
    client.handle_pdu(&mut transport, &[0x11, 0x06, 0x01, 0x00, 0x10, 0x00, 0x0D, 0x18]);
    client.handle_pdu(&mut transport, &error_rsp(ATT_READ_BY_GROUP_TYPE_REQ, 0x0011, 0x0A));
    events(&mut client);
    transport.clear();

    client
        .discover_characteristics(&mut transport, 0x0001, &[Uuid::from_u16(0x2A37)])
        .unwrap();
    assert_eq!(transport.att()[0], vec![0x08, 0x01, 0x00, 0x10, 0x00, 0x03, 0x28]);

    client.handle_pdu(
        &mut transport,
        &[
            0x09, 0x07, 0x02, 0x00, 0x02, 0x03, 0x00, 0x00, 0x2A, 0x04, 0x00, 0x1A, 0x05, 0x00,
            0x01, 0x2A,
        ],
    );
    assert_eq!(transport.att()[1], vec![0x08, 0x06, 0x00, 0x10, 0x00, 0x03, 0x28]);

    client.handle_pdu(&mut transport, &[0x09, 0x07, 0x07, 0x00, 0x10, 0x08, 0x00, 0x37, 0x2A]);
    assert_eq!(transport.att()[2], vec![0x08, 0x09, 0x00, 0x10, 0x00, 0x03, 0x28]);

    client.handle_pdu(&mut transport, &error_rsp(ATT_READ_BY_TYPE_REQ, 0x0009, 0x0A));
    assert_eq!(transport.att().len(), 3);

    let db = client.database();
    assert_eq!(db.characteristic(0x0002).unwrap().end_handle, 0x0003);
    assert_eq!(db.characteristic(0x0004).unwrap().end_handle, 0x0006);
    assert_eq!(db.characteristic(0x0007).unwrap().end_handle, 0x0010);
    assert_eq!(
        db.characteristic(0x0004).unwrap().properties.capability_names(),
        vec!["read", "write", "notify"]
    );

    match events(&mut client).as_slice() {
        [GattEvent::CharacteristicsDiscovered {
            service_handle,
            characteristics,
        }] => {
            assert_eq!(*service_handle, 0x0001);
            assert_eq!(characteristics.len(), 1);
            assert_eq!(characteristics[0].value_handle, 0x0008);
        }
        other => panic!("unexpected events {:?}", other),
    }
}

#[test]
fn test_characteristic_discovery_stops_at_service_end() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.discover_services(&mut transport, &[]).unwrap();
    client.handle_pdu(&mut transport, &[0x11, 0x06, 0x01, 0x00, 0x03, 0x00, 0x0F, 0x18]);
    client.handle_pdu(&mut transport, &error_rsp(ATT_READ_BY_GROUP_TYPE_REQ, 0x0004, 0x0A));
    transport.clear();

    client.discover_characteristics(&mut transport, 0x0001, &[]).unwrap();
    client.handle_pdu(&mut transport, &[0x09, 0x07, 0x02, 0x00, 0x12, 0x03, 0x00, 0x19, 0x2A]);

    // Value handle + 1 reached the service end; no further request
    assert_eq!(transport.att().len(), 1);
    assert!(!client.is_outstanding());
}

#[test]
fn test_included_service_discovery() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.discover_services(&mut transport, &[]).unwrap();
    client.handle_pdu(&mut transport, &[0x11, 0x06, 0x01, 0x00, 0x10, 0x00, 0x0D, 0x18]);
    client.handle_pdu(&mut transport, &error_rsp(ATT_READ_BY_GROUP_TYPE_REQ, 0x0011, 0x0A));
    events(&mut client);
    transport.clear();

    client
        .discover_included_services(&mut transport, 0x0001, &[])
        .unwrap();
    assert_eq!(transport.att()[0], vec![0x08, 0x01, 0x00, 0x10, 0x00, 0x02, 0x28]);

    client.handle_pdu(
        &mut transport,
        &[0x09, 0x08, 0x02, 0x00, 0x20, 0x00, 0x30, 0x00, 0x0F, 0x18],
    );
    assert_eq!(transport.att()[1], vec![0x08, 0x03, 0x00, 0x10, 0x00, 0x02, 0x28]);
    client.handle_pdu(&mut transport, &error_rsp(ATT_READ_BY_TYPE_REQ, 0x0003, 0x0A));

    let include = IncludedService {
        declaration_handle: 0x0002,
        start_handle: 0x0020,
        end_handle: 0x0030,
        uuid: Some(Uuid::from_u16(0x180F)),
    };
    assert_eq!(
        events(&mut client),
        vec![GattEvent::IncludedServicesDiscovered {
            service_handle: 0x0001,
            included: vec![include.clone()],
        }]
    );
    assert_eq!(
        client.database().get(0x0002),
        Some(&Attribute::IncludedService(include))
    );
}

#[test]
fn test_descriptor_discovery_without_room_sends_nothing() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.discover_services(&mut transport, &[]).unwrap();
    client.handle_pdu(&mut transport, &[0x11, 0x06, 0x01, 0x00, 0x03, 0x00, 0x0F, 0x18]);
    client.handle_pdu(&mut transport, &error_rsp(ATT_READ_BY_GROUP_TYPE_REQ, 0x0004, 0x0A));
    client.discover_characteristics(&mut transport, 0x0001, &[]).unwrap();
    client.handle_pdu(&mut transport, &[0x09, 0x07, 0x02, 0x00, 0x12, 0x03, 0x00, 0x19, 0x2A]);
    events(&mut client);
    transport.clear();

    client.discover_descriptors(&mut transport, 0x0002, &[]).unwrap();

    assert!(transport.sent.is_empty());
    assert_eq!(
        events(&mut client),
        vec![GattEvent::DescriptorsDiscovered {
            characteristic_handle: 0x0002,
            descriptors: vec![],
        }]
    );
}

#[test]
fn test_descriptor_discovery() {
    let (mut client, mut transport) = client_with_characteristic(0x10);

    client.discover_descriptors(&mut transport, 0x0002, &[]).unwrap();
    assert_eq!(transport.att()[0], vec![0x04, 0x04, 0x00, 0x08, 0x00]);

    client.handle_pdu(
        &mut transport,
        &[0x05, 0x01, 0x04, 0x00, 0x02, 0x29, 0x05, 0x00, 0x01, 0x29],
    );
    assert_eq!(transport.att()[1], vec![0x04, 0x06, 0x00, 0x08, 0x00]);

    client.handle_pdu(&mut transport, &error_rsp(ATT_FIND_INFO_REQ, 0x0006, 0x0A));

    match events(&mut client).as_slice() {
        [GattEvent::DescriptorsDiscovered { descriptors, .. }] => {
            assert_eq!(descriptors.len(), 2);
            assert_eq!(descriptors[0].uuid, Uuid::from_u16(0x2902));
        }
        other => panic!("unexpected events {:?}", other),
    }
    assert!(client.database().descriptor(0x0005).is_some());
}

#[test]
fn test_read_continues_with_blob_when_truncated() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.read_handle(&mut transport, 0x0003).unwrap();
    assert_eq!(transport.att()[0], vec![0x0A, 0x03, 0x00]);

    // Full MTU sized response
    let mut first = vec![ATT_READ_RSP];
    first.extend_from_slice(&[0xAA; 22]);
    client.handle_pdu(&mut transport, &first);
    assert_eq!(transport.att().len(), 2);
    assert_eq!(transport.att()[1], vec![0x0C, 0x03, 0x00, 0x16, 0x00]);

    client.handle_pdu(&mut transport, &[ATT_READ_BLOB_RSP, 0xBB, 0xBB]);
    assert_eq!(transport.att().len(), 2);

    let mut expected = vec![0xAA; 22];
    expected.extend_from_slice(&[0xBB, 0xBB]);
    assert_eq!(
        events(&mut client),
        vec![GattEvent::HandleRead {
            handle: 0x0003,
            value: expected,
            error: None,
        }]
    );
}

#[test]
fn test_short_read_does_not_continue() {
    let (mut client, mut transport) = client_with_characteristic(0x02);

    client.read(&mut transport, 0x0002).unwrap();
    assert_eq!(transport.att()[0], vec![0x0A, 0x03, 0x00]);

    client.handle_pdu(&mut transport, &[ATT_READ_RSP, 0x01, 0x02]);
    assert_eq!(transport.att().len(), 1);
    assert_eq!(
        events(&mut client),
        vec![GattEvent::Read {
            characteristic_handle: 0x0002,
            value: vec![0x01, 0x02],
            error: None,
        }]
    );
}

#[test]
fn test_read_error_reports_code() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.read_handle(&mut transport, 0x0003).unwrap();
    client.handle_pdu(&mut transport, &error_rsp(ATT_READ_REQ, 0x0003, 0x02));

    assert_eq!(
        events(&mut client),
        vec![GattEvent::HandleRead {
            handle: 0x0003,
            value: vec![],
            error: Some(AttErrorCode::ReadNotPermitted),
        }]
    );
}

#[test]
fn test_long_write_chunks_and_executes() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);
    let data: Vec<u8> = (0..40).collect();

    client.write_handle(&mut transport, 0x0003, &data, false).unwrap();

    // Echo every prepared chunk back
    for _ in 0..3 {
        let mut echo = transport.att().last().unwrap().clone();
        assert_eq!(echo[0], ATT_PREPARE_WRITE_REQ);
        echo[0] = ATT_PREPARE_WRITE_RSP;
        client.handle_pdu(&mut transport, &echo);
    }

    let sent = transport.att();
    assert_eq!(sent.len(), 4);
    let chunks: Vec<(u16, usize)> = sent[..3]
        .iter()
        .map(|pdu| (u16::from_le_bytes([pdu[3], pdu[4]]), pdu.len() - 5))
        .collect();
    assert_eq!(chunks, vec![(0, 18), (18, 18), (36, 4)]);
    assert_eq!(&sent[2][5..], &data[36..]);
    assert_eq!(sent[3], vec![ATT_EXECUTE_WRITE_REQ, 0x01]);

    assert!(events(&mut client).is_empty());
    client.handle_pdu(&mut transport, &[ATT_EXECUTE_WRITE_RSP]);
    assert_eq!(
        events(&mut client),
        vec![GattEvent::HandleWritten {
            handle: 0x0003,
            result: Ok(()),
        }]
    );
}

#[test]
fn test_long_write_cancel() {
    let (mut client, mut transport) = client_with_characteristic(0x08);

    client
        .long_write(&mut transport, 0x0002, &[1, 2, 3], false, ExecuteWrite::Cancel)
        .unwrap();
    assert_eq!(transport.att()[0], vec![0x16, 0x03, 0x00, 0x00, 0x00, 1, 2, 3]);

    client.handle_pdu(&mut transport, &[0x17, 0x03, 0x00, 0x00, 0x00, 1, 2, 3]);
    assert_eq!(transport.att()[1], vec![ATT_EXECUTE_WRITE_REQ, 0x00]);

    client.handle_pdu(&mut transport, &[ATT_EXECUTE_WRITE_RSP]);
    assert_eq!(
        events(&mut client),
        vec![GattEvent::Written {
            characteristic_handle: 0x0002,
            result: Ok(()),
        }]
    );
}

#[test]
fn test_acknowledged_write() {
    let (mut client, mut transport) = client_with_characteristic(0x08);

    client.write(&mut transport, 0x0002, &[0x01], false).unwrap();
    assert_eq!(transport.att()[0], vec![0x12, 0x03, 0x00, 0x01]);
    client.handle_pdu(&mut transport, &[ATT_WRITE_RSP]);

    client.write(&mut transport, 0x0002, &[0x02], false).unwrap();
    client.handle_pdu(&mut transport, &error_rsp(ATT_WRITE_REQ, 0x0003, 0x03));

    assert_eq!(
        events(&mut client),
        vec![
            GattEvent::Written {
                characteristic_handle: 0x0002,
                result: Ok(()),
            },
            GattEvent::Written {
                characteristic_handle: 0x0002,
                result: Err(AttError::Protocol(AttErrorCode::WriteNotPermitted, 0x0003)),
            },
        ]
    );
}

#[test]
fn test_unacknowledged_write_completes_when_sent() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    // Queued behind an outstanding read
    client.read_handle(&mut transport, 0x0010).unwrap();
    client.write_handle(&mut transport, 0x0003, &[0xFF], true).unwrap();
    assert_eq!(transport.att().len(), 1);
    assert!(events(&mut client).is_empty());

    client.handle_pdu(&mut transport, &[ATT_READ_RSP]);
    assert_eq!(transport.att()[1], vec![0x52, 0x03, 0x00, 0xFF]);
    assert_eq!(
        events(&mut client),
        vec![
            GattEvent::HandleRead {
                handle: 0x0010,
                value: vec![],
                error: None,
            },
            GattEvent::HandleWritten {
                handle: 0x0003,
                result: Ok(()),
            },
        ]
    );
}

#[test]
fn test_write_preconditions() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    assert_eq!(
        client.write_handle(&mut transport, 0x0003, &[0u8; 21], true),
        Err(AttError::InvalidAttributeValueLength(21))
    );
    assert_eq!(
        client.write_handle(&mut transport, 0x0003, &[0u8; 513], false),
        Err(AttError::InvalidAttributeValueLength(513))
    );
    assert!(client.exchange_mtu(&mut transport, 22).is_err());
    assert!(transport.sent.is_empty());
}

#[test]
fn test_unknown_handles_are_skipped() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.read(&mut transport, 0x0042).unwrap();
    client.discover_characteristics(&mut transport, 0x0001, &[]).unwrap();
    client.notify(&mut transport, 0x0042, true).unwrap();
    client.read_descriptor(&mut transport, 0x0042).unwrap();

    assert!(transport.sent.is_empty());
    assert!(events(&mut client).is_empty());
}

#[test]
fn test_mtu_exchange() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.exchange_mtu(&mut transport, 256).unwrap();
    assert_eq!(transport.att()[0], vec![0x02, 0x00, 0x01]);

    client.handle_pdu(&mut transport, &[0x03, 0xB9, 0x00]);
    assert_eq!(client.mtu(), 185);

    client.exchange_mtu(&mut transport, 256).unwrap();
    client.handle_pdu(&mut transport, &error_rsp(ATT_EXCHANGE_MTU_REQ, 0x0000, 0x06));
    assert_eq!(client.mtu(), 185);

    assert_eq!(
        events(&mut client),
        vec![
            GattEvent::MtuChanged { mtu: 185 },
            GattEvent::MtuChanged { mtu: 185 },
        ]
    );
}

#[test]
fn test_notifications_bypass_the_queue() {
    let (mut client, mut transport) = client_with_characteristic(0x30);

    client.read_handle(&mut transport, 0x0003).unwrap();
    client.handle_pdu(&mut transport, &[ATT_HANDLE_VALUE_NTF, 0x03, 0x00, 0x2A]);

    assert!(client.is_outstanding());
    assert_eq!(
        events(&mut client),
        vec![GattEvent::Notification {
            handle: 0x0003,
            characteristic_handle: Some(0x0002),
            value: vec![0x2A],
            indication: false,
        }]
    );
}

#[test]
fn test_indication_is_confirmed() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.handle_pdu(&mut transport, &[ATT_HANDLE_VALUE_IND, 0x20, 0x00, 0x01]);

    assert_eq!(transport.att(), vec![vec![ATT_HANDLE_VALUE_CONF]]);
    assert_eq!(
        events(&mut client),
        vec![
            GattEvent::Notification {
                handle: 0x0020,
                characteristic_handle: None,
                value: vec![0x01],
                indication: true,
            },
            GattEvent::IndicationConfirmed { handle: 0x0020 },
        ]
    );
}

#[test]
fn test_echo_is_ignored() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.read_handle(&mut transport, 0x0003).unwrap();
    client.handle_pdu(&mut transport, &[0x0A, 0x03, 0x00]);

    // No request-not-supported reply and the read is still pending
    assert_eq!(transport.att().len(), 1);
    assert!(client.is_outstanding());
}

#[test]
fn test_peer_requests_are_refused() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.handle_pdu(&mut transport, &[0x0A, 0x01, 0x00]);
    assert_eq!(transport.att(), vec![vec![0x01, 0x0A, 0x00, 0x00, 0x06]]);

    // Commands get no reply
    client.handle_pdu(&mut transport, &[0x52, 0x01, 0x00, 0x00]);
    assert_eq!(transport.att().len(), 1);
}

#[test]
fn test_multi_role_ignores_peer_requests() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, true);

    client.handle_pdu(&mut transport, &[0x10, 0x01, 0x00, 0xFF, 0xFF, 0x00, 0x28]);
    assert!(transport.sent.is_empty());
}

#[test]
fn test_unsolicited_response_is_dropped() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    assert_eq!(client.handle_pdu(&mut transport, &[ATT_READ_RSP, 0x01]), AttDispatch::Handled);
    assert!(transport.sent.is_empty());
    assert!(events(&mut client).is_empty());
}

#[test]
fn test_auth_error_keeps_transaction_outstanding() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.read_handle(&mut transport, 0x0003).unwrap();
    let dispatch = client.handle_pdu(&mut transport, &error_rsp(ATT_READ_REQ, 0x0003, 0x05));

    assert_eq!(dispatch, AttDispatch::SecurityRequired);
    assert!(client.is_outstanding());
    assert!(events(&mut client).is_empty());

    // Once encrypted the same error completes the read
    client.set_encrypted(true);
    client.set_encrypted(false);
    assert_eq!(client.security(), SecurityLevel::Medium);

    let dispatch = client.handle_pdu(&mut transport, &error_rsp(ATT_READ_REQ, 0x0003, 0x05));
    assert_eq!(dispatch, AttDispatch::Handled);
    assert_eq!(
        events(&mut client),
        vec![GattEvent::HandleRead {
            handle: 0x0003,
            value: vec![],
            error: Some(AttErrorCode::InsufficientAuthentication),
        }]
    );
}

#[test]
fn test_notify_toggle_prefers_notify_bit() {
    let (mut client, mut transport) = client_with_characteristic(0x30);

    client.notify(&mut transport, 0x0002, true).unwrap();
    assert_eq!(transport.att()[0], vec![0x08, 0x02, 0x00, 0x08, 0x00, 0x02, 0x29]);

    // Indications already on
    client.handle_pdu(&mut transport, &[0x09, 0x04, 0x04, 0x00, 0x02, 0x00]);
    assert_eq!(transport.att()[1], vec![0x12, 0x04, 0x00, 0x03, 0x00]);

    client.handle_pdu(&mut transport, &[ATT_WRITE_RSP]);
    assert_eq!(
        events(&mut client),
        vec![GattEvent::NotifyChanged {
            characteristic_handle: 0x0002,
            result: Ok(true),
        }]
    );
}

#[test]
fn test_indicate_only_toggle() {
    let (mut client, mut transport) = client_with_characteristic(0x20);

    client.notify(&mut transport, 0x0002, false).unwrap();
    client.handle_pdu(&mut transport, &[0x09, 0x04, 0x04, 0x00, 0x03, 0x00]);
    assert_eq!(transport.att()[1], vec![0x12, 0x04, 0x00, 0x01, 0x00]);
}

#[test]
fn test_broadcast_without_descriptor_fails() {
    let (mut client, mut transport) = client_with_characteristic(0x01);

    client.broadcast(&mut transport, 0x0002, true).unwrap();
    assert_eq!(transport.att()[0], vec![0x08, 0x02, 0x00, 0x08, 0x00, 0x03, 0x29]);

    client.handle_pdu(&mut transport, &error_rsp(ATT_READ_BY_TYPE_REQ, 0x0002, 0x0A));
    assert_eq!(transport.att().len(), 1);
    assert_eq!(
        events(&mut client),
        vec![GattEvent::BroadcastChanged {
            characteristic_handle: 0x0002,
            result: Err(AttError::Protocol(AttErrorCode::AttributeNotFound, 0x0002)),
        }]
    );
}

#[test]
fn test_descriptor_value_read_and_write() {
    let (mut client, mut transport) = client_with_characteristic(0x10);
    client.discover_descriptors(&mut transport, 0x0002, &[]).unwrap();
    client.handle_pdu(&mut transport, &[0x05, 0x01, 0x08, 0x00, 0x02, 0x29]);
    events(&mut client);
    transport.clear();

    client.read_descriptor(&mut transport, 0x0008).unwrap();
    client.handle_pdu(&mut transport, &[ATT_READ_RSP, 0x01, 0x00]);
    client.write_descriptor(&mut transport, 0x0008, &[0x00, 0x00]).unwrap();
    client.handle_pdu(&mut transport, &[ATT_WRITE_RSP]);

    assert_eq!(
        transport.att(),
        vec![vec![0x0A, 0x08, 0x00], vec![0x12, 0x08, 0x00, 0x00, 0x00]]
    );
    assert_eq!(
        events(&mut client),
        vec![
            GattEvent::DescriptorRead {
                handle: 0x0008,
                value: vec![0x01, 0x00],
                error: None,
            },
            GattEvent::DescriptorWritten {
                handle: 0x0008,
                result: Ok(()),
            },
        ]
    );
}

#[test]
fn test_reset_discards_pending_transactions() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.read_handle(&mut transport, 0x0003).unwrap();
    client.read_handle(&mut transport, 0x0004).unwrap();
    client.reset();

    assert!(!client.is_outstanding());
    client.handle_pdu(&mut transport, &[ATT_READ_RSP, 0x01]);
    assert_eq!(transport.att().len(), 1);
    assert!(events(&mut client).is_empty());
}

#[test]
fn test_peer_command_does_not_complete_request() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.read_handle(&mut transport, 0x0003).unwrap();
    client.handle_pdu(&mut transport, &[ATT_WRITE_CMD, 0x01, 0x00, 0xAA]);
    client.handle_pdu(&mut transport, &[0xD2, 0x01, 0x00, 0xAA]);

    assert!(client.is_outstanding());
    assert!(events(&mut client).is_empty());
    assert_eq!(transport.att().len(), 1);

    client.handle_pdu(&mut transport, &[ATT_READ_RSP, 0x42]);
    assert_eq!(
        events(&mut client),
        vec![GattEvent::HandleRead {
            handle: 0x0003,
            value: vec![0x42],
            error: None,
        }]
    );
}

#[test]
fn test_stale_command_echo_is_ignored() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.write_handle(&mut transport, 0x0005, &[0x01], true).unwrap();
    client.read_handle(&mut transport, 0x0003).unwrap();
    events(&mut client);

    // Loopback copy of the command arrives after the read went out
    client.handle_pdu(&mut transport, &[ATT_WRITE_CMD, 0x05, 0x00, 0x01]);
    assert!(client.is_outstanding());
    assert!(events(&mut client).is_empty());

    client.handle_pdu(&mut transport, &[ATT_READ_RSP, 0x07]);
    assert_eq!(
        events(&mut client),
        vec![GattEvent::HandleRead {
            handle: 0x0003,
            value: vec![0x07],
            error: None,
        }]
    );
}

#[test]
fn test_request_matching_completed_pdu_is_refused() {
    let mut transport = MockTransport::new();
    let mut client = GattClient::new(CONN, false);

    client.read_handle(&mut transport, 0x0003).unwrap();
    client.handle_pdu(&mut transport, &[ATT_READ_RSP]);

    // Same bytes as our finished read, so this time it comes from the peer
    client.handle_pdu(&mut transport, &[0x0A, 0x03, 0x00]);
    assert_eq!(
        transport.att(),
        vec![vec![0x0A, 0x03, 0x00], vec![0x01, 0x0A, 0x00, 0x00, 0x06]]
    );
}
