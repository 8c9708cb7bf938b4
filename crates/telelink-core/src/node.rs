//! Sender node driver.
//!
//! Runs one handshake per cycle: sample the sensor, execute the actions the
//! [`Handshake`] asks for through the [`Link`], then log the verdict at info
//! and flush the receive queue. [`Node::run`] adds the idle period between
//! cycles.

use std::{collections::VecDeque, time::Duration};

use tracing::info;

use crate::{
    config::{LinkConfig, RadioSettings},
    env::Environment,
    error::{ConfigError, HandshakeError},
    handshake::{CycleVerdict, Handshake, HandshakeAction},
    link::Link,
    radio::Radio,
    sensor::{Celsius, TemperatureSensor},
};

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Success or the reason for failure
    pub verdict: CycleVerdict,
    /// Reading taken at the start of the cycle
    pub sample: Celsius,
    /// Time from sampling to verdict
    pub elapsed: Duration,
}

/// Running totals across cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Cycles started
    pub attempted: u64,
    /// Cycles acknowledged by the peer
    pub delivered: u64,
}

/// Sender node.
#[derive(Debug)]
pub struct Node<R, S, E> {
    link: Link<R, E>,
    sensor: S,
    handshake: Handshake,
    stats: CycleStats,
}

impl<R: Radio, S: TemperatureSensor, E: Environment> Node<R, S, E> {
    /// Create a node after validating `config`.
    pub fn new(radio: R, sensor: S, env: E, config: LinkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let handshake = Handshake::new(config.peer_id, config.abort_on_transmit_failure);
        Ok(Self {
            link: Link::new(radio, env, config),
            sensor,
            handshake,
            stats: CycleStats::default(),
        })
    }

    /// Apply transceiver settings. An error here means the radio is unusable.
    pub fn configure_radio(&mut self, settings: &RadioSettings) -> Result<(), R::Error> {
        self.link.radio_mut().configure(settings)
    }

    /// The link this node sends through.
    pub fn link(&self) -> &Link<R, E> {
        &self.link
    }

    /// Mutable access to the link.
    pub fn link_mut(&mut self) -> &mut Link<R, E> {
        &mut self.link
    }

    /// Totals so far.
    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Run one complete RTS/CTS/MSG/ACK attempt.
    pub fn run_cycle(&mut self) -> Result<CycleReport, HandshakeError> {
        let started = self.link.env().now();
        let sample = self.sensor.read();
        self.stats.attempted += 1;

        self.handshake.reset();
        let mut pending: VecDeque<HandshakeAction> =
            self.handshake.start(sample.to_payload())?.into();

        while let Some(action) = pending.pop_front() {
            let next = match action {
                HandshakeAction::Send { destination, control, payload } => {
                    let result = self.link.send_packet(destination, control, payload).map(|_| ());
                    self.handshake.handle_sent(result)?
                },
                HandshakeAction::Await(expected) => {
                    let result = self.link.await_message(expected);
                    self.handshake.handle_reply(result)?
                },
                HandshakeAction::Finish(verdict) => {
                    let elapsed = self.link.env().now().saturating_sub(started);
                    let report = CycleReport { verdict, sample, elapsed };
                    self.finish(&report);
                    return Ok(report);
                },
            };
            pending.extend(next);
        }

        Err(HandshakeError::Stalled { state: self.handshake.state().clone() })
    }

    /// Sleep for the configured idle period.
    pub fn rest(&self) {
        self.link.env().delay(self.link.config().idle_period);
    }

    /// Repeat cycle and idle period, `cycles` times or forever.
    pub fn run(&mut self, cycles: Option<u64>) -> Result<CycleStats, HandshakeError> {
        let mut done: u64 = 0;
        while cycles.is_none_or(|limit| done < limit) {
            self.run_cycle()?;
            self.rest();
            done += 1;
        }
        Ok(self.stats)
    }

    fn finish(&mut self, report: &CycleReport) {
        let elapsed_ms = report.elapsed.as_millis() as u64;
        match &report.verdict {
            CycleVerdict::Delivered { ack } => {
                self.stats.delivered += 1;
                info!(
                    origin = %ack.origin,
                    destination = %ack.destination,
                    control = %ack.control,
                    sequence = ack.sequence,
                    payload = ?ack.payload.value(),
                    sample = %report.sample,
                    elapsed_ms,
                    "delivered, received {ack}"
                );
            },
            CycleVerdict::Failed(reason) => {
                info!(%reason, sample = %report.sample, elapsed_ms, "cycle failed");
            },
        }
        self.link.flush_rx();
    }
}
