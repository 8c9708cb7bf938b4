//! Packet framing, send and bounded reply wait.
//!
//! [`Link`] owns the radio together with its packet buffers and the sequence
//! counter. Both node roles use it; the configured `node_id` and `peer_id` decide which replies are
//! accepted.
//!
//! Radio mode discipline: transmits only happen after the channel guard has
//! left the radio idle, and every wait switches the receiver on first and off
//! again before returning.

use std::time::Duration;

use telelink_proto::{Control, NodeId, PACKET_SIZE, Packet, Payload, ProtocolError};
use tracing::{debug, warn};

use crate::{
    channel::ChannelGuard, config::LinkConfig, env::Environment, error::LinkError, radio::Radio,
};

/// Radio link to a single fixed peer.
#[derive(Debug)]
pub struct Link<R, E> {
    radio: R,
    env: E,
    config: LinkConfig,
    guard: ChannelGuard,
    sequence: u8,
    tx_buf: [u8; PACKET_SIZE],
    rx_buf: [u8; PACKET_SIZE],
}

impl<R: Radio, E: Environment> Link<R, E> {
    /// Create a link. The configuration is taken as is; call
    /// [`LinkConfig::validate`] first.
    pub fn new(radio: R, env: E, config: LinkConfig) -> Self {
        let guard = config.channel_guard();
        Self {
            radio,
            env,
            config,
            guard,
            sequence: 0,
            tx_buf: [0; PACKET_SIZE],
            rx_buf: [0; PACKET_SIZE],
        }
    }

    /// Link configuration.
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Underlying radio.
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Mutable access to the underlying radio.
    pub fn radio_mut(&mut self) -> &mut R {
        &mut self.radio
    }

    /// Clock used by the link.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Sequence index the next packet will carry.
    pub fn sequence(&self) -> u8 {
        self.sequence
    }

    /// Block until the channel is sensed clear. See [`ChannelGuard`].
    pub fn wait_for_clear_channel(&mut self) -> Result<u32, LinkError> {
        self.guard.wait_for_clear_channel(&mut self.radio, &self.env)
    }

    /// Frame a packet and transmit it once the channel is clear.
    ///
    /// Busy channels are retried by the guard. A failed transmit is not
    /// retried. The sequence index advances with every transmit attempt.
    pub fn send_packet(
        &mut self,
        destination: NodeId,
        control: Control,
        payload: Payload,
    ) -> Result<Packet, LinkError> {
        let packet = Packet {
            origin: self.config.node_id,
            destination,
            control,
            sequence: self.sequence,
            payload,
        };
        let len = packet.encode_into(&mut self.tx_buf);
        debug!(
            %control,
            sequence = packet.sequence,
            frame = %hex::encode(&self.tx_buf[..len]),
            "framed packet"
        );

        let probes = self.wait_for_clear_channel()?;
        let sent = self.radio.write(&self.tx_buf[..len]);
        self.sequence = self.sequence.wrapping_add(1);

        if sent {
            debug!(%control, probes, "packet transmitted");
            Ok(packet)
        } else {
            warn!(%control, probes, "radio reported transmit failure");
            Err(LinkError::TransmitFailed { control })
        }
    }

    /// Wait for a reply of type `expected` from the peer.
    ///
    /// Anything else that arrives is discarded together with the rest of the
    /// receive queue. Gives up after the reply timeout, so the call never
    /// takes longer than the timeout plus one poll interval.
    pub fn await_message(&mut self, expected: Control) -> Result<Packet, LinkError> {
        self.listen(|control| control == expected)
            .map_err(|waited| LinkError::ReplyTimeout { expected, waited })
    }

    /// Wait for any packet from the peer whose control type satisfies
    /// `accepts`.
    ///
    /// On timeout returns how long the receiver was on.
    pub fn listen(&mut self, accepts: impl Fn(Control) -> bool) -> Result<Packet, Duration> {
        self.radio.start_listening();
        let started = self.env.now();

        loop {
            let waited = self.env.now().saturating_sub(started);
            if waited >= self.config.reply_timeout {
                self.radio.stop_listening();
                debug!(waited_ms = waited.as_millis() as u64, "reply wait timed out");
                return Err(waited);
            }

            if self.radio.available() {
                let len = self.radio.read(&mut self.rx_buf);
                let frame = self.rx_buf.get(..len).ok_or(ProtocolError::TooLong { len });
                match frame.and_then(Packet::decode) {
                    Ok(packet) if self.is_from_peer(&packet) && accepts(packet.control) => {
                        self.radio.stop_listening();
                        return Ok(packet);
                    },
                    Ok(packet) => debug!(%packet, "ignoring packet"),
                    Err(error) => debug!(%error, "discarding undecodable frame"),
                }
            }

            self.radio.flush_rx();
            self.env.delay(self.config.poll_interval);
        }
    }

    /// Flush the receive queue.
    pub fn flush_rx(&mut self) {
        self.radio.flush_rx();
    }

    /// Sent by the configured peer and addressed to this node.
    fn is_from_peer(&self, packet: &Packet) -> bool {
        packet.origin == self.config.peer_id && packet.destination == self.config.node_id
    }
}
