/// Example driving the GATT client against a scripted peripheral
///
/// The "link" is an in-memory queue: every PDU the host writes is answered
/// by `peripheral_reply` and fed back as inbound channel data.
use bluelink::*;
use std::collections::VecDeque;

const CONN: u16 = 0x0040;

#[derive(Debug, Default)]
struct ScriptedLink {
    outbox: VecDeque<(u16, u16, Vec<u8>)>,
}

impl Transport for ScriptedLink {
    fn send_channel_data(&mut self, connection: u16, channel: u16, data: &[u8]) {
        self.outbox.push_back((connection, channel, data.to_vec()));
    }

    fn start_encryption(&mut self, connection: u16, _random: [u8; 8], _diversifier: u16, key: [u8; 16]) {
        println!("Start encryption on 0x{:04x} with key {:02x?}", connection, key);
    }
}

fn not_found(request: u8, handle: u16) -> Vec<u8> {
    let mut pdu = vec![0x01, request];
    pdu.extend_from_slice(&handle.to_le_bytes());
    pdu.push(0x0A);
    pdu
}

/// Battery service at 0x0001 with a readable, notifying level at 0x0003
fn peripheral_reply(pdu: &[u8]) -> Option<Vec<u8>> {
    let start = || u16::from_le_bytes([pdu[1], pdu[2]]);

    match *pdu.first()? {
        0x02 => Some(vec![0x03, 0xB9, 0x00]),
        0x10 if start() == 0x0001 => Some(vec![0x11, 0x06, 0x01, 0x00, 0xFF, 0xFF, 0x0F, 0x18]),
        0x08 => match (start(), u16::from_le_bytes([pdu[5], pdu[6]])) {
            (0x0001, 0x2803) => Some(vec![0x09, 0x07, 0x02, 0x00, 0x12, 0x03, 0x00, 0x19, 0x2A]),
            (_, 0x2902) => Some(vec![0x09, 0x04, 0x04, 0x00, 0x00, 0x00]),
            _ => Some(not_found(0x08, start())),
        },
        0x04 if start() == 0x0004 => Some(vec![0x05, 0x01, 0x04, 0x00, 0x02, 0x29]),
        0x0A => Some(vec![0x0B, 0x64]),
        0x12 => Some(vec![0x13]),
        request @ (0x04 | 0x10) => Some(not_found(request, start())),
        _ => None,
    }
}

/// Answer everything the host wrote, then print what it reported
fn pump(host: &mut Host<ScriptedLink>) -> Vec<Event> {
    while let Some((connection, channel, pdu)) = host.transport_mut().outbox.pop_front() {
        println!("  -> {:02x?}", pdu);
        if let Some(reply) = peripheral_reply(&pdu) {
            println!("  <- {:02x?}", reply);
            host.on_channel_data(connection, channel, Some(&reply));
        }
    }

    let events: Vec<Event> = std::iter::from_fn(|| host.poll_event()).collect();
    for event in &events {
        println!("Event: {:?}", event);
    }
    events
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("GATT Client Example");
    println!("-------------------");

    let local = DeviceAddress::new("C0:11:22:33:44:55".parse()?, AddressType::Random);
    let peer = DeviceAddress::new("00:1A:7D:DA:71:13".parse()?, AddressType::Public);

    let mut host = Host::new(ScriptedLink::default(), HostConfig::from_env());
    host.on_connection_established(CONN, local, peer);
    pump(&mut host);

    println!("\nDiscovering services...");
    host.discover_services(CONN, &[])?;
    let services: Vec<Service> = pump(&mut host)
        .into_iter()
        .filter_map(|event| match event {
            Event::Gatt {
                event: GattEvent::ServicesDiscovered { services },
                ..
            } => Some(services),
            _ => None,
        })
        .flatten()
        .collect();

    for service in &services {
        println!("\nDiscovering characteristics of {} ...", service.uuid);
        host.discover_characteristics(CONN, service.start_handle, &[])?;
    }
    let characteristics: Vec<Characteristic> = pump(&mut host)
        .into_iter()
        .filter_map(|event| match event {
            Event::Gatt {
                event: GattEvent::CharacteristicsDiscovered { characteristics, .. },
                ..
            } => Some(characteristics),
            _ => None,
        })
        .flatten()
        .collect();

    for characteristic in &characteristics {
        println!(
            "\nCharacteristic {} [{}]",
            characteristic.uuid,
            characteristic.properties.capability_names().join(", ")
        );
        host.discover_descriptors(CONN, characteristic.start_handle, &[])?;
        if characteristic.properties.can_read() {
            host.read(CONN, characteristic.start_handle)?;
        }
        if characteristic.properties.can_notify() {
            host.notify(CONN, characteristic.start_handle, true)?;
        }
        pump(&mut host);
    }

    println!("\nPeripheral sends a notification...");
    host.on_channel_data(CONN, ATT_CID, Some(&[0x1B, 0x03, 0x00, 0x63]));
    pump(&mut host);

    host.on_connection_terminated(CONN);
    pump(&mut host);

    Ok(())
}
