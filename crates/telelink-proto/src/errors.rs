//! Protocol error types.

use thiserror::Error;

/// Result alias for wire format operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while decoding a packet from raw radio bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Fewer bytes than the fixed header.
    #[error("packet too short: {len} bytes, header needs {}", crate::HEADER_SIZE)]
    TooShort {
        /// Number of bytes received
        len: usize,
    },

    /// More bytes than a full packet.
    #[error("packet too long: {len} bytes, maximum is {}", crate::PACKET_SIZE)]
    TooLong {
        /// Number of bytes received
        len: usize,
    },

    /// Control byte is not one of MSG, ACK, RTS, CTS.
    #[error("invalid control code {0}")]
    InvalidControl(u8),
}
