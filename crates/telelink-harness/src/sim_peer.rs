//! Scripted far end of the link.

use std::time::Duration;

use telelink_core::{config::LinkConfig, responder::Responder};
use telelink_proto::{Control, NodeId, Packet};

/// Default time between a frame leaving the sender and the peer's reply
/// arriving.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(2);

/// Gap between stray packets and the real reply, long enough that the
/// sender's poll loop flushes the strays before the reply lands.
pub const NOISE_GAP: Duration = Duration::from_millis(25);

/// Peer node with fault injection.
#[derive(Debug, Clone)]
pub struct SimPeer {
    responder: Responder,
    id: NodeId,
    sequence: u8,
    latency: Duration,
    dropped: Vec<Control>,
    noise: Vec<Packet>,
}

impl SimPeer {
    /// Peer that answers everything, for a sender configured with `config`.
    pub fn responsive(config: &LinkConfig) -> Self {
        let peer_config = config.mirrored();
        Self {
            responder: Responder::new(&peer_config),
            id: peer_config.node_id,
            sequence: 0,
            latency: DEFAULT_LATENCY,
            dropped: Vec::new(),
            noise: Vec::new(),
        }
    }

    /// Peer that never answers.
    pub fn silent(config: &LinkConfig) -> Self {
        Self::responsive(config).dropping(Control::Cts).dropping(Control::Ack)
    }

    /// Never send replies of type `control`.
    #[must_use]
    pub fn dropping(mut self, control: Control) -> Self {
        self.dropped.push(control);
        self
    }

    /// Reply after `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Before every reply, put these packets on the air.
    #[must_use]
    pub fn with_noise(mut self, noise: Vec<Packet>) -> Self {
        self.noise = noise;
        self
    }

    /// The wrapped responder.
    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    /// React to a frame the sender put on the air at `now`.
    ///
    /// Returns the frames the peer transmits in response, each with its
    /// arrival time at the sender.
    pub fn on_air(&mut self, packet: &Packet, now: Duration) -> Vec<(Duration, Packet)> {
        let Some(reply) = self.responder.handle(packet) else {
            return Vec::new();
        };
        if self.dropped.contains(&reply.control) {
            return Vec::new();
        }

        let mut frames: Vec<(Duration, Packet)> =
            self.noise.iter().map(|noise| (now + self.latency, *noise)).collect();

        let gap = if self.noise.is_empty() { Duration::ZERO } else { NOISE_GAP };
        let reply = Packet {
            origin: self.id,
            destination: reply.destination,
            control: reply.control,
            sequence: self.sequence,
            payload: reply.payload,
        };
        self.sequence = self.sequence.wrapping_add(1);
        frames.push((now + self.latency + gap, reply));
        frames
    }
}
