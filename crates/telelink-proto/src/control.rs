//! Control codes carried in header byte 2.

use std::fmt;

use crate::errors::{ProtocolError, Result};

/// Packet control type.
///
/// The numeric values are part of the wire format and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Control {
    /// Data message carrying the sampled value
    Msg = 0,
    /// Acknowledgement of a data message
    Ack = 1,
    /// Request to send
    Rts = 2,
    /// Clear to send
    Cts = 3,
}

impl Control {
    /// All control codes in wire order.
    pub const ALL: [Self; 4] = [Self::Msg, Self::Ack, Self::Rts, Self::Cts];

    /// Wire value of this control code.
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse a wire value.
    pub const fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Msg),
            1 => Ok(Self::Ack),
            2 => Ok(Self::Rts),
            3 => Ok(Self::Cts),
            other => Err(ProtocolError::InvalidControl(other)),
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Msg => "MSG",
            Self::Ack => "ACK",
            Self::Rts => "RTS",
            Self::Cts => "CTS",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_are_stable() {
        assert_eq!(Control::Msg.to_u8(), 0);
        assert_eq!(Control::Ack.to_u8(), 1);
        assert_eq!(Control::Rts.to_u8(), 2);
        assert_eq!(Control::Cts.to_u8(), 3);
    }

    #[test]
    fn rejects_unknown_codes() {
        for value in 4..=u8::MAX {
            assert_eq!(Control::from_u8(value), Err(ProtocolError::InvalidControl(value)));
        }
    }
}
