//! Wire format for the telelink radio handshake.
//!
//! Every packet starts with a fixed 4-byte header (origin, destination,
//! control, sequence) followed by at most one payload byte. The radio is
//! configured for a fixed 5-byte payload, so a full packet fits one radio
//! frame and control-only packets leave the last byte unused.
//!
//! ```text
//! ┌────────┬─────────────┬─────────┬──────────┬───────────────────┐
//! │ origin │ destination │ control │ sequence │ value (MSG only)  │
//! └────────┴─────────────┴─────────┴──────────┴───────────────────┘
//!    0           1            2          3            4
//! ```
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod control;
pub mod errors;
pub mod header;
pub mod packet;

pub use control::Control;
pub use errors::{ProtocolError, Result};
pub use header::PacketHeader;
pub use packet::{NodeId, Packet, Payload};

/// Size of the fixed packet header in bytes.
pub const HEADER_SIZE: usize = 4;

/// Size of a full packet (header plus one payload byte). This is also the
/// fixed payload size the radio is configured with.
pub const PACKET_SIZE: usize = HEADER_SIZE + 1;
