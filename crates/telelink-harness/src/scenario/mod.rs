//! Scenario testing framework.
//!
//! A scenario wires a sender [`telelink_core::node::Node`] to a simulated
//! radio and a scripted peer, runs a number of cycles in virtual time, and
//! hands the resulting [`World`] to an oracle. A scenario cannot be run
//! without an oracle.
//!
//! ```
//! use telelink_harness::scenario::{Scenario, oracle};
//!
//! let result = Scenario::new("one delivery")
//!     .cycles(1)
//!     .oracle(oracle::all_delivered())
//!     .run();
//! assert!(result.is_ok());
//! ```

mod builder;
pub mod oracle;
mod world;

pub use builder::{RunnableScenario, Scenario};
pub use world::{CycleRecord, World};

/// Verification function run against the final world state.
pub type OracleFn = Box<dyn Fn(&World) -> Result<(), String>>;
