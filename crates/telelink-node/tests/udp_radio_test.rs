//! Emulated radio over loopback UDP, including a full handshake between two
//! threads.

use std::{
    net::{Ipv4Addr, SocketAddr},
    thread,
    time::Duration,
};

use telelink_core::{
    config::{LinkConfig, RadioSettings},
    env::SystemEnv,
    handshake::CycleVerdict,
    link::Link,
    node::Node,
    proto::{Control, NodeId, Packet, Payload},
    radio::Radio,
    responder::Responder,
    sensor::FixedSensor,
};
use telelink_node::udp_radio::{UdpRadio, UdpRadioError};

fn any_port() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 0))
}

/// Two radios addressed to each other.
fn pair() -> (UdpRadio, UdpRadio) {
    let mut a = UdpRadio::bind(any_port(), any_port()).unwrap();
    let mut b = UdpRadio::bind(any_port(), any_port()).unwrap();
    a.set_peer(b.local_addr().unwrap());
    b.set_peer(a.local_addr().unwrap());
    a.configure(&RadioSettings::default()).unwrap();
    b.configure(&RadioSettings::default()).unwrap();
    (a, b)
}

/// Poll until `radio` has a frame or give up after one second.
fn wait_available(radio: &mut UdpRadio) -> bool {
    for _ in 0..100 {
        if radio.available() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn frames_are_padded_to_payload_size() {
    let (mut tx, mut rx) = pair();
    rx.start_listening();

    assert!(tx.write(&[31, 11, 2, 0]));
    assert!(wait_available(&mut rx));

    let mut buf = [0xFF; 8];
    assert_eq!(rx.read(&mut buf), 5);
    assert_eq!(&buf[..5], &[31, 11, 2, 0, 0]);
    assert_eq!(rx.read(&mut buf), 0);
}

#[test]
fn oversized_datagram_reports_full_length() {
    let (mut tx, mut rx) = pair();
    rx.start_listening();

    assert!(tx.write(&[11, 31, 3, 0, 0, 0xEE, 0xEE]));
    assert!(wait_available(&mut rx));

    let mut buf = [0u8; 5];
    assert_eq!(rx.read(&mut buf), 7);
    assert_eq!(buf, [11, 31, 3, 0, 0]);
}

#[test]
fn frames_sent_while_receiver_off_are_lost() {
    let (mut tx, mut rx) = pair();

    assert!(tx.write(&[31, 11, 0, 1, 25]));
    thread::sleep(Duration::from_millis(50));
    rx.start_listening();

    assert!(!rx.available());
    assert_eq!(rx.queued(), 0);
}

#[test]
fn carrier_reflects_last_listening_window() {
    let (mut tx, mut rx) = pair();

    rx.start_listening();
    assert!(tx.write(&[31, 11, 2, 0]));
    assert!(wait_available(&mut rx));
    rx.stop_listening();
    assert!(rx.carrier_detected());

    rx.flush_rx();
    rx.start_listening();
    rx.stop_listening();
    assert!(!rx.carrier_detected());
}

#[test]
fn write_while_listening_fails() {
    let (mut tx, _rx) = pair();
    tx.start_listening();
    assert!(!tx.write(&[31, 11, 2, 0]));
}

#[test]
fn oversized_payload_is_rejected() {
    let (mut radio, _) = pair();
    let settings = RadioSettings { payload_size: 32, ..RadioSettings::default() };
    assert!(matches!(radio.configure(&settings), Err(UdpRadioError::PayloadSize { size: 32, .. })));
}

#[test]
fn handshake_over_loopback() {
    let (sender_radio, mut responder_radio) = pair();
    let config = LinkConfig {
        reply_timeout: Duration::from_millis(2000),
        idle_period: Duration::from_millis(20),
        ..LinkConfig::default()
    };

    // Receiver on before the sender can transmit.
    responder_radio.start_listening();
    let responder_config = config.mirrored();
    let responder = thread::spawn(move || {
        let mut responder = Responder::new(&responder_config);
        let mut link = Link::new(responder_radio, SystemEnv::new(), responder_config);
        let mut replies = Vec::new();
        while replies.len() < 2 {
            match responder.serve(&mut link) {
                Ok(Some(reply)) => replies.push(reply),
                Ok(None) => break,
                Err(e) => panic!("responder failed: {e}"),
            }
        }
        (replies, responder.last_value())
    });

    let mut node = Node::new(sender_radio, FixedSensor(355), SystemEnv::new(), config).unwrap();
    let report = node.run_cycle().unwrap();
    let (replies, last_value) = responder.join().unwrap();

    let controls: Vec<Control> = replies.iter().map(|p| p.control).collect();
    assert_eq!(controls, [Control::Cts, Control::Ack]);
    assert_eq!(last_value, Some(25));

    let CycleVerdict::Delivered { ack } = report.verdict else {
        panic!("cycle failed: {:?}", report.verdict);
    };
    assert_eq!(ack, Packet {
        origin: NodeId(11),
        destination: NodeId(31),
        control: Control::Ack,
        sequence: 1,
        payload: Payload::Value(25),
    });
}
