//! Radio transceiver abstraction.
//!
//! Mirrors the small surface of an nRF24-class driver that the link needs.
//! The transceiver has two modes: listening (receiver on) and idle, where
//! `write` is allowed. The link always stops listening before transmitting
//! and starts listening before polling for a reply.

use crate::config::RadioSettings;

/// Packet radio driver.
pub trait Radio {
    /// Driver error, only raised while bringing the hardware up.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Apply channel, power, data rate and payload settings.
    ///
    /// Failure here is terminal for the node.
    fn configure(&mut self, settings: &RadioSettings) -> Result<(), Self::Error>;

    /// Switch the receiver on.
    fn start_listening(&mut self);

    /// Switch the receiver off so the radio can transmit.
    fn stop_listening(&mut self);

    /// Transmit one frame. Returns whether the radio reports success.
    fn write(&mut self, frame: &[u8]) -> bool;

    /// Whether a received frame is waiting in the receive queue.
    fn available(&mut self) -> bool;

    /// Pop the oldest received frame into `buf`.
    ///
    /// Returns the length of the frame as received, which exceeds
    /// `buf.len()` when the frame did not fit. Bytes past `buf.len()` are
    /// dropped.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    /// Discard everything in the receive queue.
    fn flush_rx(&mut self);

    /// Carrier detected during the last listening window.
    fn carrier_detected(&mut self) -> bool;
}

impl<R: Radio + ?Sized> Radio for &mut R {
    type Error = R::Error;

    fn configure(&mut self, settings: &RadioSettings) -> Result<(), Self::Error> {
        (**self).configure(settings)
    }

    fn start_listening(&mut self) {
        (**self).start_listening();
    }

    fn stop_listening(&mut self) {
        (**self).stop_listening();
    }

    fn write(&mut self, frame: &[u8]) -> bool {
        (**self).write(frame)
    }

    fn available(&mut self) -> bool {
        (**self).available()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        (**self).read(buf)
    }

    fn flush_rx(&mut self) {
        (**self).flush_rx();
    }

    fn carrier_detected(&mut self) -> bool {
        (**self).carrier_detected()
    }
}
