//! Peer role over the simulated radio.

use std::time::Duration;

use telelink_core::{config::LinkConfig, env::Environment, link::Link, responder::Responder};
use telelink_harness::{Direction, SimEnv, SimRadio};
use telelink_proto::{Control, NodeId, Packet, Payload};

const SENDER: NodeId = NodeId(31);
const PEER: NodeId = NodeId(11);

fn peer_link() -> (Link<SimRadio, SimEnv>, Responder, SimEnv) {
    let env = SimEnv::new();
    let config = LinkConfig::default().mirrored();
    let responder = Responder::new(&config);
    (Link::new(SimRadio::new(env.clone()), env.clone(), config), responder, env)
}

#[test]
fn answers_rts_with_cts() {
    let (mut link, mut responder, _env) = peer_link();
    let air = link.radio().air();
    let rts = Packet::control_only(SENDER, PEER, Control::Rts, 0);
    air.inject(Duration::from_millis(4), rts.encode());

    let sent = responder.serve(&mut link).unwrap().unwrap();

    assert_eq!(sent.control, Control::Cts);
    assert_eq!(sent.origin, PEER);
    assert_eq!(sent.destination, SENDER);
    let tx: Vec<Vec<u8>> = air
        .wire()
        .into_iter()
        .filter(|e| e.direction == Direction::Tx)
        .map(|e| e.bytes)
        .collect();
    assert_eq!(tx, vec![vec![11, 31, 3, 0]]);
}

#[test]
fn answers_msg_with_echoing_ack() {
    let (mut link, mut responder, _env) = peer_link();
    let msg = Packet {
        origin: SENDER,
        destination: PEER,
        control: Control::Msg,
        sequence: 1,
        payload: Payload::Value(21),
    };
    link.radio().air().inject(Duration::from_millis(4), msg.encode());

    let sent = responder.serve(&mut link).unwrap().unwrap();

    assert_eq!(sent.control, Control::Ack);
    assert_eq!(sent.payload, Payload::Value(21));
    assert_eq!(responder.last_value(), Some(21));
    assert_eq!(responder.delivered(), 1);
}

#[test]
fn quiet_channel_yields_nothing() {
    let (mut link, mut responder, env) = peer_link();

    assert_eq!(responder.serve(&mut link), Ok(None));
    assert!(env.now() >= Duration::from_millis(5000));
    assert!(link.radio().air().wire().is_empty());
}

#[test]
fn ignores_requests_from_other_nodes() {
    let (mut link, mut responder, _env) = peer_link();
    let foreign = Packet::control_only(NodeId(40), PEER, Control::Rts, 0);
    link.radio().air().inject(Duration::from_millis(4), foreign.encode());

    assert_eq!(responder.serve(&mut link), Ok(None));
}
