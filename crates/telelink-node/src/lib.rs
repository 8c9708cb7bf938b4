//! Host node for the telelink radio link.
//!
//! Runs either role of the handshake on a regular computer. The radio is
//! emulated over UDP ([`udp_radio::UdpRadio`]) and the temperature comes from
//! a synthetic sensor unless a fixed raw reading is given.

pub mod cli;
pub mod synthetic;
pub mod udp_radio;

use std::{io, net::SocketAddr};

use telelink_core::{
    config::{LinkConfig, RadioSettings},
    env::SystemEnv,
    error::{ConfigError, HandshakeError},
    link::Link,
    node::Node,
    radio::Radio,
    responder::Responder,
    sensor::{FixedSensor, TemperatureSensor},
};
use thiserror::Error;
use tracing::{error, info, warn};

pub use cli::{Cli, LinkArgs, Role};
use synthetic::SyntheticSensor;
use udp_radio::{UdpRadio, UdpRadioError};

/// Errors that stop the node.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Configuration rejected before start-up.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Radio could not be opened.
    #[error("radio socket: {0}")]
    Socket(#[from] io::Error),

    /// Radio did not accept its settings. Terminal: the node halts.
    #[error("radio hardware is not responding: {0}")]
    RadioInit(#[from] UdpRadioError),

    /// Handshake driver misbehaved.
    #[error("handshake: {0}")]
    Handshake(#[from] HandshakeError),
}

/// Run the role selected on the command line.
pub fn run(cli: Cli) -> Result<(), NodeError> {
    let config = cli.link.to_config();
    let settings = cli.link.radio_settings();
    let (bind, peer) = cli.addresses();

    match cli.role {
        Role::Sender { cycles, raw_adc, seed } => {
            let radio = open_radio(bind, peer)?;
            match raw_adc {
                Some(raw) => run_sender(radio, FixedSensor(raw), config, &settings, cycles),
                None => run_sender(radio, SyntheticSensor::new(seed), config, &settings, cycles),
            }
        },
        Role::Responder { requests } => {
            let mut radio = open_radio(bind, peer)?;
            init_radio(&mut radio, &settings)?;
            run_responder(radio, config.mirrored(), requests)
        },
    }
}

fn open_radio(bind: SocketAddr, peer: SocketAddr) -> Result<UdpRadio, NodeError> {
    let radio = UdpRadio::bind(bind, peer)?;
    info!(%bind, %peer, "radio socket open");
    Ok(radio)
}

fn init_radio<R: Radio>(radio: &mut R, settings: &RadioSettings) -> Result<(), R::Error> {
    radio.configure(settings).inspect_err(|e| error!(error = %e, "radio init failed, halting"))
}

fn run_sender<S: TemperatureSensor>(
    radio: UdpRadio,
    sensor: S,
    config: LinkConfig,
    settings: &RadioSettings,
    cycles: Option<u64>,
) -> Result<(), NodeError> {
    let mut node = Node::new(radio, sensor, SystemEnv::new(), config)?;
    init_radio(node.link_mut().radio_mut(), settings)?;
    let config = node.link().config();
    info!(node = %config.node_id, peer = %config.peer_id, "sender ready");

    let stats = node.run(cycles)?;
    info!(attempted = stats.attempted, delivered = stats.delivered, "sender finished");
    Ok(())
}

fn run_responder(
    radio: UdpRadio,
    config: LinkConfig,
    requests: Option<u64>,
) -> Result<(), NodeError> {
    config.validate()?;
    let mut responder = Responder::new(&config);
    let mut link = Link::new(radio, SystemEnv::new(), config);

    let mut answered: u64 = 0;
    while requests.is_none_or(|limit| answered < limit) {
        match responder.serve(&mut link) {
            Ok(Some(_reply)) => answered += 1,
            Ok(None) => {},
            Err(error) => warn!(%error, "reply not sent"),
        }
    }
    info!(answered, delivered = responder.delivered(), "responder finished");
    Ok(())
}
