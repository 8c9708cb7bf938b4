//! Telelink link-layer logic
//!
//! A sender node samples a temperature and delivers it to one fixed peer over
//! a low-power packet radio using a request-to-send / clear-to-send / message
//! / acknowledge exchange, with a carrier-sense check before every
//! transmission.
//!
//! # Architecture
//!
//! The handshake itself is a deterministic state machine ([`handshake`]) that
//! knows nothing about radios or clocks. Each transition returns declarative
//! actions (send this packet, wait for that reply, finish the cycle). The
//! [`node`] driver executes those actions through a [`link::Link`], which owns
//! the radio, the clock, the packet buffers and the sequence counter.
//!
//! Hardware is reached only through the [`radio::Radio`],
//! [`sensor::TemperatureSensor`] and [`env::Environment`] traits, so the same
//! code runs on a real transceiver, a host emulation, or the deterministic
//! simulation harness.
//!
//! # Components
//!
//! - [`channel`]: Channel access guard (carrier sense with backoff)
//! - [`link`]: Packet framing, send, and bounded wait for a reply
//! - [`handshake`]: RTS/CTS/MSG/ACK state machine
//! - [`node`]: Sender driver running one handshake per cycle
//! - [`responder`]: Peer role answering RTS with CTS and MSG with ACK
//! - [`config`]: Link and radio configuration with deployment defaults
//! - [`error`]: Error types
//! - [`mod@env`]: Clock and delay abstraction
//! - [`radio`]: Radio transceiver abstraction
//! - [`sensor`]: Temperature sensor abstraction and calibration

pub mod channel;
pub mod config;
pub mod env;
pub mod error;
pub mod handshake;
pub mod link;
pub mod node;
pub mod radio;
pub mod responder;
pub mod sensor;

pub use telelink_proto as proto;
