//! Packet type and its encoding.

use std::fmt;

use crate::{
    HEADER_SIZE, PACKET_SIZE,
    control::Control,
    errors::{ProtocolError, Result},
    header::PacketHeader,
};

/// Radio node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u8);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for NodeId {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

/// Optional application value carried in byte 4.
///
/// `Value(0)` is a real reading; `Empty` means the byte is not written at
/// all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Payload {
    /// Control-only packet, no value byte
    #[default]
    Empty,
    /// One byte of application value
    Value(u8),
}

impl Payload {
    /// The value byte, if any.
    pub const fn value(self) -> Option<u8> {
        match self {
            Self::Empty => None,
            Self::Value(v) => Some(v),
        }
    }
}

impl From<Option<u8>> for Payload {
    fn from(value: Option<u8>) -> Self {
        value.map_or(Self::Empty, Self::Value)
    }
}

/// A single link-layer packet.
///
/// Built right before a send and dropped after transmission or reception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Packet {
    /// Sending node
    pub origin: NodeId,
    /// Receiving node
    pub destination: NodeId,
    /// Packet type
    pub control: Control,
    /// Sender's sequence index
    pub sequence: u8,
    /// Optional value byte
    pub payload: Payload,
}

impl Packet {
    /// Control-only packet (RTS, CTS, or an ACK without echo).
    pub const fn control_only(
        origin: NodeId,
        destination: NodeId,
        control: Control,
        sequence: u8,
    ) -> Self {
        Self { origin, destination, control, sequence, payload: Payload::Empty }
    }

    /// Header view of this packet.
    pub const fn header(&self) -> PacketHeader {
        PacketHeader {
            origin: self.origin.0,
            destination: self.destination.0,
            control: self.control.to_u8(),
            sequence: self.sequence,
        }
    }

    /// Number of bytes [`Packet::encode`] produces.
    pub const fn encoded_len(&self) -> usize {
        match self.payload {
            Payload::Empty => HEADER_SIZE,
            Payload::Value(_) => PACKET_SIZE,
        }
    }

    /// Write the packet into a radio-sized buffer.
    ///
    /// Returns the number of meaningful bytes. Bytes past that length are
    /// left untouched.
    pub fn encode_into(&self, buf: &mut [u8; PACKET_SIZE]) -> usize {
        buf[..HEADER_SIZE].copy_from_slice(&self.header().to_bytes());
        if let Payload::Value(v) = self.payload {
            buf[HEADER_SIZE] = v;
        }
        self.encoded_len()
    }

    /// Encode into a freshly allocated buffer.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = [0u8; PACKET_SIZE];
        let len = self.encode_into(&mut buf);
        buf[..len].to_vec()
    }

    /// Decode raw radio bytes.
    ///
    /// A fifth byte, when present, is taken as the payload.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > PACKET_SIZE {
            return Err(ProtocolError::TooLong { len: bytes.len() });
        }

        let (header, rest) = PacketHeader::from_prefix(bytes)?;
        let control = header.control()?;

        Ok(Self {
            origin: NodeId(header.origin),
            destination: NodeId(header.destination),
            control,
            sequence: header.sequence,
            payload: rest.first().copied().into(),
        })
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "O: {} D: {} C: {} i: {} :",
            self.origin, self.destination, self.control, self.sequence
        )?;
        if let Payload::Value(v) = self.payload {
            write!(f, " {v}")?;
        }
        Ok(())
    }
}
