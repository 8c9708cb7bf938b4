//! Zero-copy view of the fixed packet header.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::{
    HEADER_SIZE,
    control::Control,
    errors::{ProtocolError, Result},
};

/// The 4-byte header shared by every packet type.
///
/// Fields are raw bytes so any received buffer can be viewed without
/// validation; use [`PacketHeader::control`] to validate the control byte.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned,
)]
#[repr(C)]
pub struct PacketHeader {
    /// Sending node id
    pub origin: u8,
    /// Receiving node id
    pub destination: u8,
    /// Raw control code
    pub control: u8,
    /// Sender's sequence index at the time of sending
    pub sequence: u8,
}

const _: () = assert!(size_of::<PacketHeader>() == HEADER_SIZE);

impl PacketHeader {
    /// View the header at the start of `bytes` without copying.
    ///
    /// Returns the header and whatever follows it.
    pub fn from_prefix(bytes: &[u8]) -> Result<(&Self, &[u8])> {
        Self::ref_from_prefix(bytes).map_err(|_| ProtocolError::TooShort { len: bytes.len() })
    }

    /// Validated control code.
    pub fn control(&self) -> Result<Control> {
        Control::from_u8(self.control)
    }

    /// Raw header bytes in wire order.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out.copy_from_slice(self.as_bytes());
        out
    }
}
