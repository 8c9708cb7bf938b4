//! Peer role of the handshake.
//!
//! The responder answers an RTS from its configured sender with a CTS and a
//! MSG with an ACK echoing the received value. It keeps no per-exchange
//! state, so a sender that restarts its cycle at any point is simply served
//! again.

use telelink_proto::{Control, NodeId, Packet, Payload};
use tracing::info;

use crate::{config::LinkConfig, env::Environment, error::LinkError, link::Link, radio::Radio};

/// Reply the responder wants sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reply {
    /// Receiving node
    pub destination: NodeId,
    /// Packet type
    pub control: Control,
    /// Value byte, if any
    pub payload: Payload,
}

/// Peer that acknowledges delivered values.
#[derive(Debug, Clone)]
pub struct Responder {
    node_id: NodeId,
    sender: NodeId,
    last_value: Option<u8>,
    delivered: u64,
}

impl Responder {
    /// Responder for the link described by `config`, seen from the peer
    /// side: `config.node_id` is the responder, `config.peer_id` the sender.
    pub fn new(config: &LinkConfig) -> Self {
        Self { node_id: config.node_id, sender: config.peer_id, last_value: None, delivered: 0 }
    }

    /// Last value received in a MSG.
    pub fn last_value(&self) -> Option<u8> {
        self.last_value
    }

    /// Number of MSG packets acknowledged.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Decide how to answer `packet`. `None` means stay silent.
    pub fn handle(&mut self, packet: &Packet) -> Option<Reply> {
        if packet.origin != self.sender || packet.destination != self.node_id {
            return None;
        }

        match packet.control {
            Control::Rts => Some(self.reply(Control::Cts, Payload::Empty)),
            Control::Msg => {
                self.last_value = packet.payload.value();
                self.delivered += 1;
                info!(value = ?self.last_value, sequence = packet.sequence, "value received");
                Some(self.reply(Control::Ack, packet.payload))
            },
            Control::Ack | Control::Cts => None,
        }
    }

    /// Listen for one RTS or MSG on `link` and answer it.
    ///
    /// Returns the reply that was sent, or `None` if nothing arrived before
    /// the link's reply timeout. A quiet period is logged at info together
    /// with the latest reading, so the log doubles as a monitor.
    pub fn serve<R: Radio, E: Environment>(
        &mut self,
        link: &mut Link<R, E>,
    ) -> Result<Option<Packet>, LinkError> {
        let Ok(packet) = link.listen(|control| matches!(control, Control::Rts | Control::Msg))
        else {
            info!(
                latest = ?self.last_value,
                delivered = self.delivered,
                "no request from sender"
            );
            return Ok(None);
        };

        match self.handle(&packet) {
            Some(reply) => {
                link.send_packet(reply.destination, reply.control, reply.payload).map(Some)
            },
            None => Ok(None),
        }
    }

    fn reply(&self, control: Control, payload: Payload) -> Reply {
        Reply { destination: self.sender, control, payload }
    }
}
