//! Handshake state machine for one delivery cycle.
//!
//! # Architecture: Action-Based State Machine
//!
//! - Methods take the outcome of the previous action as a parameter
//! - Methods return `Result<Vec<HandshakeAction>, HandshakeError>`
//! - The driver ([`crate::node::Node`]) executes the actions against the link
//!
//! # State Machine
//!
//! ```text
//! ┌──────┐ start ┌─────────┐ sent ┌──────────┐ CTS ┌─────────┐ sent ┌──────────┐
//! │ Idle │──────>│ SentRts │─────>│ AwaitCts │────>│ SentMsg │─────>│ AwaitAck │
//! └──────┘       └─────────┘      └──────────┘     └─────────┘      └──────────┘
//!     ↑               │ failed         │ timeout        │ failed          │ ACK/timeout
//!     │ reset         ↓                ↓                ↓                 ↓
//!     │          ┌─────────────────────────────────────────────────────────┐
//!     └──────────│                          Done                           │
//!                └─────────────────────────────────────────────────────────┘
//! ```
//!
//! A MSG packet is only ever requested after a CTS was received, and a cycle
//! is only successful if the ACK arrives too. Nothing survives a
//! [`Handshake::reset`]: every cycle starts from `Idle`.

use telelink_proto::{Control, NodeId, Packet, Payload};
use tracing::warn;

use crate::error::{HandshakeError, LinkError};

/// Outcome of a finished cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleVerdict {
    /// Peer acknowledged the message
    Delivered {
        /// The acknowledgement as received
        ack: Packet,
    },
    /// Cycle ended without an acknowledgement
    Failed(LinkError),
}

impl CycleVerdict {
    /// Whether the value was acknowledged.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// Handshake state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeState {
    /// Nothing in flight
    Idle,
    /// RTS handed to the link
    SentRts,
    /// Waiting for the peer's CTS
    AwaitCts,
    /// MSG handed to the link
    SentMsg,
    /// Waiting for the peer's ACK
    AwaitAck,
    /// Cycle finished
    Done(CycleVerdict),
}

/// Actions for the driver to execute, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeAction {
    /// Frame and transmit a packet, then report with
    /// [`Handshake::handle_sent`]
    Send {
        /// Receiving node
        destination: NodeId,
        /// Packet type
        control: Control,
        /// Value byte, if any
        payload: Payload,
    },
    /// Wait for a reply of this type, then report with
    /// [`Handshake::handle_reply`]
    Await(Control),
    /// Cycle is over
    Finish(CycleVerdict),
}

/// RTS/CTS/MSG/ACK state machine.
#[derive(Debug, Clone)]
pub struct Handshake {
    state: HandshakeState,
    peer: NodeId,
    abort_on_transmit_failure: bool,
    value: Option<u8>,
}

impl Handshake {
    /// New handshake in `Idle` talking to `peer`.
    ///
    /// When `abort_on_transmit_failure` is false a failed transmit is logged
    /// and the reply is awaited anyway.
    pub fn new(peer: NodeId, abort_on_transmit_failure: bool) -> Self {
        Self { state: HandshakeState::Idle, peer, abort_on_transmit_failure, value: None }
    }

    /// Current state.
    pub fn state(&self) -> &HandshakeState {
        &self.state
    }

    /// Value being delivered in the current cycle.
    pub fn value(&self) -> Option<u8> {
        self.value
    }

    /// Return to `Idle`, dropping everything from the previous cycle.
    pub fn reset(&mut self) {
        self.state = HandshakeState::Idle;
        self.value = None;
    }

    /// Begin a cycle delivering `value`: requests an RTS.
    pub fn start(&mut self, value: u8) -> Result<Vec<HandshakeAction>, HandshakeError> {
        if self.state != HandshakeState::Idle {
            return Err(self.invalid("start"));
        }

        self.value = Some(value);
        self.state = HandshakeState::SentRts;
        Ok(vec![self.send(Control::Rts, Payload::Empty)])
    }

    /// Report the result of the last requested send.
    pub fn handle_sent(
        &mut self,
        result: Result<(), LinkError>,
    ) -> Result<Vec<HandshakeAction>, HandshakeError> {
        let awaited = match self.state {
            HandshakeState::SentRts => Control::Cts,
            HandshakeState::SentMsg => Control::Ack,
            _ => return Err(self.invalid("handle_sent")),
        };

        match result {
            Ok(()) => {},
            Err(error @ LinkError::TransmitFailed { .. }) if !self.abort_on_transmit_failure => {
                warn!(%error, "transmit failed, awaiting {awaited} anyway");
            },
            Err(error) => return Ok(self.finish(CycleVerdict::Failed(error))),
        }

        self.state = match awaited {
            Control::Cts => HandshakeState::AwaitCts,
            _ => HandshakeState::AwaitAck,
        };
        Ok(vec![HandshakeAction::Await(awaited)])
    }

    /// Report the result of the last requested wait.
    pub fn handle_reply(
        &mut self,
        result: Result<Packet, LinkError>,
    ) -> Result<Vec<HandshakeAction>, HandshakeError> {
        let awaiting_cts = match self.state {
            HandshakeState::AwaitCts => true,
            HandshakeState::AwaitAck => false,
            _ => return Err(self.invalid("handle_reply")),
        };

        match result {
            Ok(_cts) if awaiting_cts => {
                let payload = self.value.map_or(Payload::Empty, Payload::Value);
                self.state = HandshakeState::SentMsg;
                Ok(vec![self.send(Control::Msg, payload)])
            },
            Ok(ack) => Ok(self.finish(CycleVerdict::Delivered { ack })),
            Err(error) => Ok(self.finish(CycleVerdict::Failed(error))),
        }
    }

    fn send(&self, control: Control, payload: Payload) -> HandshakeAction {
        HandshakeAction::Send { destination: self.peer, control, payload }
    }

    fn finish(&mut self, verdict: CycleVerdict) -> Vec<HandshakeAction> {
        self.state = HandshakeState::Done(verdict.clone());
        vec![HandshakeAction::Finish(verdict)]
    }

    fn invalid(&self, operation: &'static str) -> HandshakeError {
        HandshakeError::InvalidState { state: self.state.clone(), operation }
    }
}
