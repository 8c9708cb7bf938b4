//! Command-line arguments.

use std::{
    net::{Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    time::Duration,
};

use clap::{Parser, Subcommand};
use telelink_core::config::{
    DEFAULT_BUSY_BACKOFF, DEFAULT_CARRIER_SETTLE, DEFAULT_IDLE_PERIOD, DEFAULT_NODE_ID,
    DEFAULT_PEER_ID, DEFAULT_POLL_INTERVAL, DEFAULT_REPLY_TIMEOUT, LinkConfig, RadioSettings,
};

/// UDP port the sender binds by default.
pub const SENDER_PORT: u16 = 7031;

/// UDP port the responder binds by default.
pub const RESPONDER_PORT: u16 = 7011;

/// telelink node over an emulated radio
#[derive(Debug, Parser)]
#[command(name = "telelink-node", version, about)]
pub struct Cli {
    /// Which side of the link to run
    #[command(subcommand)]
    pub role: Role,

    /// Local UDP address standing in for this node's radio
    #[arg(long, global = true)]
    pub bind: Option<SocketAddr>,

    /// UDP address of the other node's radio
    #[arg(long, global = true)]
    pub peer_addr: Option<SocketAddr>,

    /// Link settings, always given from the sender's point of view
    #[command(flatten)]
    pub link: LinkArgs,
}

/// Node role.
#[derive(Debug, Subcommand)]
pub enum Role {
    /// Sample the sensor and send it to the peer every idle period
    Sender {
        /// Stop after this many cycles instead of running forever
        #[arg(long)]
        cycles: Option<u64>,

        /// Send this fixed raw ADC reading instead of a synthetic one
        #[arg(long)]
        raw_adc: Option<u16>,

        /// Seed of the synthetic sensor
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Answer RTS with CTS and MSG with ACK
    Responder {
        /// Stop after answering this many requests
        #[arg(long)]
        requests: Option<u64>,
    },
}

/// Link and radio settings.
#[derive(Debug, Clone, clap::Args)]
pub struct LinkArgs {
    /// Sender node id
    #[arg(long, global = true, default_value_t = DEFAULT_NODE_ID.0)]
    pub node_id: u8,

    /// Responder node id
    #[arg(long, global = true, default_value_t = DEFAULT_PEER_ID.0)]
    pub peer_id: u8,

    /// Bound on each CTS/ACK wait, in milliseconds
    #[arg(long, global = true, default_value_t = DEFAULT_REPLY_TIMEOUT.as_millis() as u64)]
    pub reply_timeout_ms: u64,

    /// Pause between receive polls, in milliseconds
    #[arg(long, global = true, default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64)]
    pub poll_interval_ms: u64,

    /// Pause between cycles, in milliseconds
    #[arg(long, global = true, default_value_t = DEFAULT_IDLE_PERIOD.as_millis() as u64)]
    pub idle_period_ms: u64,

    /// Carrier-sense listening window, in microseconds
    #[arg(long, global = true, default_value_t = DEFAULT_CARRIER_SETTLE.as_micros() as u64)]
    pub carrier_settle_us: u64,

    /// Backoff after a busy channel, in microseconds
    #[arg(long, global = true, default_value_t = DEFAULT_BUSY_BACKOFF.as_micros() as u64)]
    pub busy_backoff_us: u64,

    /// Give up on a busy channel after this many probes
    #[arg(long, global = true)]
    pub max_channel_attempts: Option<NonZeroU32>,

    /// Keep waiting for the reply even when the radio reports a failed write
    #[arg(long, global = true)]
    pub await_after_transmit_failure: bool,

    /// RF channel
    #[arg(long, global = true, default_value_t = RadioSettings::default().channel)]
    pub channel: u8,

    /// Fixed radio payload size in bytes
    #[arg(long, global = true, default_value_t = RadioSettings::default().payload_size)]
    pub payload_size: u8,
}

impl LinkArgs {
    /// Link configuration from the sender's point of view.
    pub fn to_config(&self) -> LinkConfig {
        LinkConfig {
            node_id: self.node_id.into(),
            peer_id: self.peer_id.into(),
            reply_timeout: Duration::from_millis(self.reply_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            idle_period: Duration::from_millis(self.idle_period_ms),
            carrier_settle: Duration::from_micros(self.carrier_settle_us),
            busy_backoff: Duration::from_micros(self.busy_backoff_us),
            max_channel_attempts: self.max_channel_attempts,
            abort_on_transmit_failure: !self.await_after_transmit_failure,
        }
    }

    /// Radio settings with the selected channel and payload size.
    pub fn radio_settings(&self) -> RadioSettings {
        RadioSettings {
            channel: self.channel,
            payload_size: self.payload_size,
            ..RadioSettings::default()
        }
    }
}

impl Cli {
    /// Local and peer radio addresses, defaulting by role.
    pub fn addresses(&self) -> (SocketAddr, SocketAddr) {
        let (local, remote) = match self.role {
            Role::Sender { .. } => (SENDER_PORT, RESPONDER_PORT),
            Role::Responder { .. } => (RESPONDER_PORT, SENDER_PORT),
        };
        let loopback = |port| SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let bind = self.bind.unwrap_or_else(|| loopback(local));
        let peer = self.peer_addr.unwrap_or_else(|| loopback(remote));
        (bind, peer)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use telelink_core::proto::NodeId;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_match_link_defaults() {
        let cli = Cli::try_parse_from(["telelink-node", "sender"]).unwrap();
        assert_eq!(cli.link.to_config(), LinkConfig::default());
        assert_eq!(cli.link.radio_settings(), RadioSettings::default());
        assert!(matches!(cli.role, Role::Sender { cycles: None, raw_adc: None, seed: 0 }));
    }

    #[test]
    fn addresses_default_by_role() {
        let sender = Cli::try_parse_from(["telelink-node", "sender"]).unwrap();
        let responder = Cli::try_parse_from(["telelink-node", "responder"]).unwrap();

        let (bind, peer) = sender.addresses();
        assert_eq!((bind.port(), peer.port()), (SENDER_PORT, RESPONDER_PORT));
        assert_eq!(responder.addresses(), (peer, bind));
    }

    #[test]
    fn flags_override_link_settings() {
        let cli = Cli::try_parse_from([
            "telelink-node",
            "sender",
            "--cycles",
            "3",
            "--raw-adc",
            "355",
            "--peer-id",
            "12",
            "--reply-timeout-ms",
            "250",
            "--max-channel-attempts",
            "8",
            "--await-after-transmit-failure",
            "--bind",
            "127.0.0.1:9000",
        ])
        .unwrap();

        let config = cli.link.to_config();
        assert_eq!(config.peer_id, NodeId(12));
        assert_eq!(config.reply_timeout, Duration::from_millis(250));
        assert_eq!(config.max_channel_attempts, NonZeroU32::new(8));
        assert!(!config.abort_on_transmit_failure);
        assert_eq!(cli.addresses().0, "127.0.0.1:9000".parse().unwrap());
        assert!(matches!(cli.role, Role::Sender { cycles: Some(3), raw_adc: Some(355), .. }));
    }
}
