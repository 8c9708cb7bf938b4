//! Link and radio configuration.
//!
//! Defaults are the values the sender node is deployed with.

use std::{num::NonZeroU32, time::Duration};

use telelink_proto::{NodeId, PACKET_SIZE};

use crate::{channel::ChannelGuard, error::ConfigError};

/// Default id of the sender node.
pub const DEFAULT_NODE_ID: NodeId = NodeId(31);

/// Default id of the peer node.
pub const DEFAULT_PEER_ID: NodeId = NodeId(11);

/// Default bound on each CTS/ACK wait.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Default pause between receive polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default pause between cycles.
pub const DEFAULT_IDLE_PERIOD: Duration = Duration::from_millis(10_000);

/// Default listening window for carrier sense.
pub const DEFAULT_CARRIER_SETTLE: Duration = Duration::from_micros(70);

/// Default backoff after a busy channel observation.
pub const DEFAULT_BUSY_BACKOFF: Duration = Duration::from_micros(270);

/// Link-layer configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// This node's id, written as origin of every packet
    pub node_id: NodeId,
    /// The only peer this node talks to
    pub peer_id: NodeId,
    /// Maximum time to wait for a CTS or ACK
    pub reply_timeout: Duration,
    /// Delay between receive polls while waiting for a reply
    pub poll_interval: Duration,
    /// Pause between the end of one cycle and the start of the next
    pub idle_period: Duration,
    /// How long the receiver stays on before carrier detect is sampled
    pub carrier_settle: Duration,
    /// Backoff after the channel was sensed busy
    pub busy_backoff: Duration,
    /// Cap on carrier-sense probes per send, `None` retries forever
    pub max_channel_attempts: Option<NonZeroU32>,
    /// End the cycle as soon as the radio reports a failed transmit
    pub abort_on_transmit_failure: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            node_id: DEFAULT_NODE_ID,
            peer_id: DEFAULT_PEER_ID,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            idle_period: DEFAULT_IDLE_PERIOD,
            carrier_settle: DEFAULT_CARRIER_SETTLE,
            busy_backoff: DEFAULT_BUSY_BACKOFF,
            max_channel_attempts: None,
            abort_on_transmit_failure: true,
        }
    }
}

impl LinkConfig {
    /// Configuration for the peer side of the link: ids swapped, everything
    /// else unchanged.
    pub fn mirrored(&self) -> Self {
        Self { node_id: self.peer_id, peer_id: self.node_id, ..self.clone() }
    }

    /// Check the configuration for values the link cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_id == self.peer_id {
            return Err(ConfigError::SelfPeer(self.node_id));
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.poll_interval >= self.reply_timeout {
            return Err(ConfigError::PollIntervalTooLong {
                poll_interval: self.poll_interval,
                reply_timeout: self.reply_timeout,
            });
        }
        Ok(())
    }

    /// Channel access guard using this configuration's timings.
    pub fn channel_guard(&self) -> ChannelGuard {
        ChannelGuard::new(self.carrier_settle, self.busy_backoff)
            .with_max_attempts(self.max_channel_attempts)
    }
}

/// Transmit power level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerLevel {
    /// -18 dBm
    Min,
    /// -12 dBm
    Low,
    /// -6 dBm
    High,
    /// 0 dBm
    #[default]
    Max,
}

/// Air data rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataRate {
    /// 250 kbit/s
    Kbps250,
    /// 1 Mbit/s
    Mbps1,
    /// 2 Mbit/s
    #[default]
    Mbps2,
}

/// Transceiver settings applied once at start-up.
///
/// Hardware auto-acknowledgement and CRC stay off: the ACK packet of the
/// handshake replaces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioSettings {
    /// RF channel number
    pub channel: u8,
    /// Transmit power
    pub power: PowerLevel,
    /// Air data rate
    pub data_rate: DataRate,
    /// Fixed payload size, equal to the packet size
    pub payload_size: u8,
    /// Hardware auto-acknowledgement
    pub auto_ack: bool,
    /// Hardware CRC
    pub crc: bool,
}

impl Default for RadioSettings {
    fn default() -> Self {
        Self {
            channel: 155,
            power: PowerLevel::Max,
            data_rate: DataRate::Mbps2,
            payload_size: PACKET_SIZE as u8,
            auto_ack: false,
            crc: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment() {
        let config = LinkConfig::default();
        assert_eq!(config.node_id, NodeId(31));
        assert_eq!(config.peer_id, NodeId(11));
        assert_eq!(config.reply_timeout, Duration::from_secs(5));
        assert_eq!(config.idle_period, Duration::from_secs(10));
        assert_eq!(config.max_channel_attempts, None);
        assert!(config.validate().is_ok());

        let radio = RadioSettings::default();
        assert_eq!(radio.payload_size, 5);
        assert!(!radio.auto_ack);
        assert!(!radio.crc);
    }

    #[test]
    fn channel_guard_carries_probe_cap() {
        assert_eq!(LinkConfig::default().channel_guard().max_attempts(), None);

        let capped =
            LinkConfig { max_channel_attempts: NonZeroU32::new(4), ..LinkConfig::default() };
        assert_eq!(capped.channel_guard().max_attempts(), NonZeroU32::new(4));
    }

    #[test]
    fn mirrored_swaps_ids() {
        let config = LinkConfig::default().mirrored();
        assert_eq!(config.node_id, NodeId(11));
        assert_eq!(config.peer_id, NodeId(31));
        assert_eq!(config.reply_timeout, DEFAULT_REPLY_TIMEOUT);
    }

    #[test]
    fn validate_rejects_unusable_values() {
        let same_ids = LinkConfig { peer_id: DEFAULT_NODE_ID, ..LinkConfig::default() };
        assert_eq!(same_ids.validate(), Err(ConfigError::SelfPeer(DEFAULT_NODE_ID)));

        let zero_poll = LinkConfig { poll_interval: Duration::ZERO, ..LinkConfig::default() };
        assert_eq!(zero_poll.validate(), Err(ConfigError::ZeroPollInterval));

        let slow_poll = LinkConfig {
            poll_interval: Duration::from_secs(6),
            ..LinkConfig::default()
        };
        assert!(matches!(slow_poll.validate(), Err(ConfigError::PollIntervalTooLong { .. })));
    }
}
