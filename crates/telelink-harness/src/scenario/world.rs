//! World state after a scenario run.

use std::time::Duration;

use telelink_core::{
    handshake::CycleVerdict,
    node::{CycleReport, CycleStats},
};
use telelink_proto::{Control, Packet};

use crate::sim_radio::{Air, Direction, WireEvent};

/// One cycle as observed by the harness.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleRecord {
    /// Virtual time when the cycle started
    pub started_at: Duration,
    /// What the node reported
    pub report: CycleReport,
}

/// Everything a scenario produced.
#[derive(Debug)]
pub struct World {
    cycles: Vec<CycleRecord>,
    air: Air,
    stats: CycleStats,
    finished_at: Duration,
}

impl World {
    pub(crate) fn new(
        cycles: Vec<CycleRecord>,
        air: Air,
        stats: CycleStats,
        finished_at: Duration,
    ) -> Self {
        Self { cycles, air, stats, finished_at }
    }

    /// Every cycle in order.
    pub fn cycles(&self) -> &[CycleRecord] {
        &self.cycles
    }

    /// Verdicts in cycle order.
    pub fn verdicts(&self) -> Vec<&CycleVerdict> {
        self.cycles.iter().map(|c| &c.report.verdict).collect()
    }

    /// ACKs received by the node, in cycle order.
    pub fn acks(&self) -> Vec<Packet> {
        self.cycles
            .iter()
            .filter_map(|c| match &c.report.verdict {
                CycleVerdict::Delivered { ack } => Some(*ack),
                CycleVerdict::Failed(_) => None,
            })
            .collect()
    }

    /// The simulated air.
    pub fn air(&self) -> &Air {
        &self.air
    }

    /// Frames in time order.
    pub fn wire(&self) -> Vec<WireEvent> {
        self.air.wire()
    }

    /// Packets the node put on the air, successful or not.
    pub fn sent_packets(&self) -> Vec<Packet> {
        self.wire()
            .iter()
            .filter(|e| e.direction == Direction::Tx)
            .filter_map(WireEvent::packet)
            .collect()
    }

    /// Successful transmits of `control` by the node.
    pub fn transmitted(&self, control: Control) -> usize {
        self.air.transmitted(control)
    }

    /// Node's running totals.
    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Virtual time at the end of the run.
    pub fn finished_at(&self) -> Duration {
        self.finished_at
    }

    /// Wire log rendered one frame per line, for snapshots.
    pub fn render_wire(&self) -> String {
        self.wire()
            .iter()
            .map(|event| {
                let dir = match event.direction {
                    Direction::Tx => "tx",
                    Direction::Rx => "rx",
                };
                let body = event
                    .packet()
                    .map_or_else(|| format!("{:?}", event.bytes), |packet| packet.to_string());
                let mark = if event.delivered { "" } else { " (lost)" };
                format!("{}ms {dir} {body}{mark}", event.at.as_millis())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
