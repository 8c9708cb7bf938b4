//! Reusable oracle functions.

use std::time::Duration;

use telelink_proto::Control;

use crate::scenario::OracleFn;

/// Pass only if every oracle passes. Stops at the first failure.
pub fn all_of(oracles: Vec<OracleFn>) -> OracleFn {
    Box::new(move |world| oracles.iter().try_for_each(|oracle| oracle(world)))
}

/// Every cycle was acknowledged.
pub fn all_delivered() -> OracleFn {
    Box::new(|world| {
        for (i, record) in world.cycles().iter().enumerate() {
            if !record.report.verdict.is_success() {
                return Err(format!("cycle {i} failed: {:?}", record.report.verdict));
            }
        }
        Ok(())
    })
}

/// No cycle was acknowledged.
pub fn none_delivered() -> OracleFn {
    Box::new(|world| {
        let delivered = world.stats().delivered;
        if delivered == 0 { Ok(()) } else { Err(format!("{delivered} cycles delivered")) }
    })
}

/// The scripted peer received exactly `count` MSG packets.
pub fn peer_received(count: u64) -> OracleFn {
    Box::new(move |world| {
        let received = world.air().peer_delivered();
        if received == count {
            Ok(())
        } else {
            Err(format!("peer received {received} values, expected {count}"))
        }
    })
}

/// The node successfully transmitted exactly `count` packets of `control`.
pub fn transmitted(control: Control, count: usize) -> OracleFn {
    Box::new(move |world| {
        let actual = world.transmitted(control);
        if actual == count {
            Ok(())
        } else {
            Err(format!("expected {count} {control} on the wire, saw {actual}"))
        }
    })
}

/// The node never put a packet of `control` on the air.
pub fn never_sent(control: Control) -> OracleFn {
    Box::new(move |world| {
        if world.sent_packets().iter().any(|p| p.control == control) {
            Err(format!("{control} was sent"))
        } else {
            Ok(())
        }
    })
}

/// Receiver never on while writing, never off while polling.
pub fn radio_discipline() -> OracleFn {
    Box::new(|world| {
        let violations = world.air().discipline_violations();
        if violations == 0 {
            Ok(())
        } else {
            Err(format!("{violations} radio mode violations"))
        }
    })
}

/// Every cycle took at most `limit`.
pub fn cycles_within(limit: Duration) -> OracleFn {
    Box::new(move |world| {
        for (i, record) in world.cycles().iter().enumerate() {
            if record.report.elapsed > limit {
                return Err(format!(
                    "cycle {i} took {:?}, limit {limit:?}",
                    record.report.elapsed
                ));
            }
        }
        Ok(())
    })
}

/// Every cycle took at least `floor`.
pub fn cycles_at_least(floor: Duration) -> OracleFn {
    Box::new(move |world| {
        for (i, record) in world.cycles().iter().enumerate() {
            if record.report.elapsed < floor {
                return Err(format!(
                    "cycle {i} took {:?}, expected at least {floor:?}",
                    record.report.elapsed
                ));
            }
        }
        Ok(())
    })
}
