//! Scenario builder API.

use telelink_core::{
    config::{LinkConfig, RadioSettings},
    env::Environment,
    node::Node,
    sensor::FixedSensor,
};
use telelink_proto::Control;

use crate::{
    scenario::{CycleRecord, OracleFn, World},
    sim_env::SimEnv,
    sim_peer::SimPeer,
    sim_radio::{Contention, SimRadio},
};

/// Raw reading used when a scenario does not set one (about 25 °C).
pub const DEFAULT_RAW_ADC: u16 = 355;

/// Scenario builder.
///
/// Must call `.oracle()` to get a [`RunnableScenario`].
pub struct Scenario {
    name: String,
    config: LinkConfig,
    peer: Option<SimPeer>,
    contention: Contention,
    failing_writes: Vec<Control>,
    raw_adc: u16,
    cycles: u64,
}

impl Scenario {
    /// Scenario with default configuration, a responsive peer, a clear
    /// channel and one cycle.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: LinkConfig::default(),
            peer: None,
            contention: Contention::Clear,
            failing_writes: Vec::new(),
            raw_adc: DEFAULT_RAW_ADC,
            cycles: 1,
        }
    }

    /// Use this sender configuration.
    #[must_use]
    pub fn config(mut self, config: LinkConfig) -> Self {
        self.config = config;
        self
    }

    /// Use this peer. Defaults to [`SimPeer::responsive`] for the configured
    /// link.
    #[must_use]
    pub fn peer(mut self, peer: SimPeer) -> Self {
        self.peer = Some(peer);
        self
    }

    /// Carrier behaviour on the channel.
    #[must_use]
    pub fn contention(mut self, contention: Contention) -> Self {
        self.contention = contention;
        self
    }

    /// Make the sender's radio fail every write of `control`.
    #[must_use]
    pub fn failing_writes(mut self, control: Control) -> Self {
        self.failing_writes.push(control);
        self
    }

    /// Raw sensor reading returned every cycle.
    #[must_use]
    pub fn raw_adc(mut self, raw: u16) -> Self {
        self.raw_adc = raw;
        self
    }

    /// Number of cycles to run.
    #[must_use]
    pub fn cycles(mut self, cycles: u64) -> Self {
        self.cycles = cycles;
        self
    }

    /// Set the oracle function and return a runnable scenario.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle that can be executed.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute the scenario.
    ///
    /// Runs every cycle followed by the idle period, exactly as
    /// [`Node::run`] does, then invokes the oracle.
    pub fn run(self) -> Result<(), String> {
        let Scenario { name, config, peer, contention, failing_writes, raw_adc, cycles } =
            self.scenario;

        let env = SimEnv::new();
        let peer = peer.unwrap_or_else(|| SimPeer::responsive(&config));
        let mut radio = SimRadio::new(env.clone()).with_peer(peer).with_contention(contention);
        for control in failing_writes {
            radio = radio.failing_writes(control);
        }
        let air = radio.air();

        let mut node = Node::new(radio, FixedSensor(raw_adc), env.clone(), config)
            .map_err(|e| format!("Scenario '{name}': invalid config: {e}"))?;
        node.configure_radio(&RadioSettings::default())
            .map_err(|e| format!("Scenario '{name}': radio init failed: {e}"))?;

        let mut records = Vec::new();
        for cycle in 0..cycles {
            let started_at = env.now();
            let report = node
                .run_cycle()
                .map_err(|e| format!("Scenario '{name}': cycle {cycle} failed: {e}"))?;
            records.push(CycleRecord { started_at, report });
            node.rest();
        }

        let world = World::new(records, air, node.stats(), env.now());
        (self.oracle)(&world).map_err(|e| format!("Scenario '{name}': {e}"))
    }
}
