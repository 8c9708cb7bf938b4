//! Scenario tests for complete delivery cycles.
//!
//! Each test runs the sender node against the scripted peer in virtual time
//! and checks the outcome with an oracle.

use std::time::Duration;

use telelink_core::{
    config::{LinkConfig, RadioSettings},
    error::LinkError,
    handshake::CycleVerdict,
};
use telelink_harness::{
    SimPeer,
    scenario::{OracleFn, Scenario, oracle},
};
use telelink_proto::{Control, NodeId, Packet, Payload};

const TIMEOUT: Duration = Duration::from_millis(5000);
const POLL: Duration = Duration::from_millis(10);

/// Oracle passing when the only cycle failed with an error matching `check`.
fn single_failure(check: fn(&LinkError) -> bool) -> OracleFn {
    Box::new(move |world| match world.verdicts().as_slice() {
        [CycleVerdict::Failed(error)] if check(error) => Ok(()),
        other => Err(format!("unexpected verdicts {other:?}")),
    })
}

#[test]
fn responsive_peer_acknowledges_sample() {
    let result = Scenario::new("peer replies CTS then ACK")
        .raw_adc(355)
        .oracle(Box::new(|world| {
            let acks = world.acks();
            let [ack] = acks.as_slice() else {
                return Err(format!("expected one ACK, got {acks:?}"));
            };

            let expected = Packet {
                origin: NodeId(11),
                destination: NodeId(31),
                control: Control::Ack,
                sequence: 1,
                payload: Payload::Value(25),
            };
            if *ack != expected {
                return Err(format!("logged ACK {ack} differs from peer's {expected}"));
            }

            let msg = world
                .sent_packets()
                .into_iter()
                .find(|p| p.control == Control::Msg)
                .ok_or("MSG never sent")?;
            if msg.payload != Payload::Value(25) {
                return Err(format!("MSG carried {:?}", msg.payload));
            }
            Ok(())
        }))
        .run();

    assert!(result.is_ok(), "scenario failed: {result:?}");
}

#[test]
fn successful_cycle_follows_radio_discipline() {
    let result = Scenario::new("discipline on success")
        .cycles(3)
        .oracle(oracle::all_of(vec![
            oracle::all_delivered(),
            oracle::radio_discipline(),
            oracle::transmitted(Control::Rts, 3),
            oracle::transmitted(Control::Msg, 3),
            oracle::peer_received(3),
        ]))
        .run();

    assert!(result.is_ok(), "scenario failed: {result:?}");
}

#[test]
fn slow_peer_still_delivers() {
    let config = LinkConfig::default();
    let result = Scenario::new("peer replies after 40 ms")
        .peer(SimPeer::responsive(&config).with_latency(Duration::from_millis(40)))
        .config(config)
        .oracle(oracle::all_of(vec![
            oracle::all_delivered(),
            oracle::peer_received(1),
            oracle::cycles_at_least(Duration::from_millis(80)),
            oracle::cycles_within(Duration::from_millis(90)),
        ]))
        .run();

    assert!(result.is_ok(), "scenario failed: {result:?}");
}

#[test]
fn radio_configured_for_fixed_five_byte_frames() {
    let result = Scenario::new("radio settings")
        .oracle(Box::new(|world| {
            let settings = world.air().settings().ok_or("radio never configured")?;
            if settings != RadioSettings::default() {
                return Err(format!("unexpected settings {settings:?}"));
            }
            if settings.auto_ack || settings.crc || settings.payload_size != 5 {
                return Err(format!("hardware ACK/CRC or payload size wrong: {settings:?}"));
            }
            Ok(())
        }))
        .run();

    assert!(result.is_ok(), "scenario failed: {result:?}");
}

#[test]
fn silent_peer_fails_without_msg() {
    let config = LinkConfig::default();
    let result = Scenario::new("peer never replies")
        .peer(SimPeer::silent(&config))
        .config(config)
        .oracle(oracle::all_of(vec![
            oracle::none_delivered(),
            oracle::never_sent(Control::Msg),
            oracle::transmitted(Control::Rts, 1),
            oracle::cycles_at_least(TIMEOUT),
            oracle::cycles_within(TIMEOUT + POLL + Duration::from_millis(1)),
            oracle::radio_discipline(),
            single_failure(|e| matches!(e, LinkError::ReplyTimeout { expected: Control::Cts, .. })),
        ]))
        .run();

    assert!(result.is_ok(), "scenario failed: {result:?}");
}

#[test]
fn missing_ack_fails_after_second_wait() {
    let config = LinkConfig::default();
    let result = Scenario::new("peer replies CTS but not ACK")
        .peer(SimPeer::responsive(&config).dropping(Control::Ack))
        .config(config)
        .oracle(oracle::all_of(vec![
            oracle::none_delivered(),
            oracle::transmitted(Control::Msg, 1),
            oracle::peer_received(1),
            oracle::cycles_at_least(TIMEOUT),
            oracle::cycles_within(TIMEOUT + POLL * 2 + Duration::from_millis(1)),
            single_failure(|e| matches!(e, LinkError::ReplyTimeout { expected: Control::Ack, .. })),
        ]))
        .run();

    assert!(result.is_ok(), "scenario failed: {result:?}");
}

#[test]
fn rts_transmit_failure_ends_cycle_immediately() {
    let result = Scenario::new("RTS write fails")
        .failing_writes(Control::Rts)
        .oracle(oracle::all_of(vec![
            oracle::none_delivered(),
            oracle::never_sent(Control::Msg),
            oracle::cycles_within(Duration::from_millis(1)),
            single_failure(|e| *e == LinkError::TransmitFailed { control: Control::Rts }),
        ]))
        .run();

    assert!(result.is_ok(), "scenario failed: {result:?}");
}

#[test]
fn transmit_failure_can_wait_out_the_timeout() {
    let config = LinkConfig { abort_on_transmit_failure: false, ..LinkConfig::default() };
    let result = Scenario::new("RTS write fails, await anyway")
        .config(config)
        .failing_writes(Control::Rts)
        .oracle(oracle::all_of(vec![
            oracle::none_delivered(),
            oracle::never_sent(Control::Msg),
            oracle::cycles_at_least(TIMEOUT),
        ]))
        .run();

    assert!(result.is_ok(), "scenario failed: {result:?}");
}

#[test]
fn idle_period_separates_cycles() {
    let result = Scenario::new("idle period")
        .cycles(3)
        .oracle(Box::new(|world| {
            let starts: Vec<Duration> = world.cycles().iter().map(|c| c.started_at).collect();
            for pair in starts.windows(2) {
                let gap = pair[1] - pair[0];
                if gap < Duration::from_secs(10) {
                    return Err(format!("cycles only {gap:?} apart"));
                }
            }
            let finished = world.finished_at();
            if finished < Duration::from_secs(30) {
                return Err(format!("run ended at {finished:?}, before the last idle period"));
            }
            Ok(())
        }))
        .run();

    assert!(result.is_ok(), "scenario failed: {result:?}");
}

#[test]
fn sequence_advances_per_packet_across_cycles() {
    let result = Scenario::new("sequence numbers")
        .cycles(2)
        .oracle(Box::new(|world| {
            let sequences: Vec<u8> = world.sent_packets().iter().map(|p| p.sequence).collect();
            if sequences == [0, 1, 2, 3] {
                Ok(())
            } else {
                Err(format!("unexpected sequences {sequences:?}"))
            }
        }))
        .run();

    assert!(result.is_ok(), "scenario failed: {result:?}");
}

#[test]
fn wire_log_of_one_delivery() {
    let result = Scenario::new("wire snapshot")
        .oracle(Box::new(|world| {
            insta::assert_snapshot!(world.render_wire(), @r"
                0ms tx O: 31 D: 11 C: RTS i: 0 :
                2ms rx O: 11 D: 31 C: CTS i: 0 :
                10ms tx O: 31 D: 11 C: MSG i: 1 : 25
                12ms rx O: 11 D: 31 C: ACK i: 1 : 25
            ");
            Ok(())
        }))
        .run();

    assert!(result.is_ok(), "scenario failed: {result:?}");
}
