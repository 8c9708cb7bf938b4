//! Deterministic simulation harness for the telelink handshake.
//!
//! A virtual clock replaces real sleeping, and a simulated radio stands in
//! for the transceiver and the air between the two nodes. The far end of the
//! link is a scripted peer built on [`telelink_core::responder::Responder`]
//! with fault injection (dropped replies, latency, stray packets, carrier
//! contention, transmit failures).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod scenario;
pub mod sim_env;
pub mod sim_peer;
pub mod sim_radio;

pub use sim_env::SimEnv;
pub use sim_peer::SimPeer;
pub use sim_radio::{Air, Contention, Direction, SimRadio, WireEvent};
