//! Error types for the link and the handshake state machine.

use std::time::Duration;

use telelink_proto::{Control, NodeId};
use thiserror::Error;

use crate::handshake::HandshakeState;

/// Failures of a single link operation.
///
/// None of these are fatal: the handshake turns them into a failed cycle and
/// the node tries again after its idle period.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Carrier was still present after the configured number of probes.
    ///
    /// Only raised when a probe cap is configured; without one the guard
    /// keeps retrying.
    #[error("channel busy after {attempts} carrier-sense probes")]
    ChannelBusy {
        /// Probes made before giving up
        attempts: u32,
    },

    /// Radio reported that the frame was not sent.
    #[error("radio failed to transmit {control}")]
    TransmitFailed {
        /// Control type of the packet that failed
        control: Control,
    },

    /// No matching reply arrived in time.
    #[error("no {expected} from peer after {waited:?}")]
    ReplyTimeout {
        /// Control type that was awaited
        expected: Control,
        /// Time spent listening
        waited: Duration,
    },
}

/// Misuse of the handshake state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandshakeError {
    /// Operation not valid in the current state.
    #[error("cannot {operation} in state {state:?}")]
    InvalidState {
        /// State when the operation was attempted
        state: HandshakeState,
        /// Operation that was attempted
        operation: &'static str,
    },

    /// Driver ran out of actions before the cycle finished.
    #[error("handshake stalled in state {state:?}")]
    Stalled {
        /// State the machine was left in
        state: HandshakeState,
    },
}

/// Invalid link configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Node configured as its own peer.
    #[error("node {0} cannot be its own peer")]
    SelfPeer(NodeId),

    /// Poll interval of zero would spin the receiver.
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,

    /// Poll interval not shorter than the reply timeout.
    #[error("poll interval {poll_interval:?} must be shorter than reply timeout {reply_timeout:?}")]
    PollIntervalTooLong {
        /// Configured poll interval
        poll_interval: Duration,
        /// Configured reply timeout
        reply_timeout: Duration,
    },
}
