//! Environment abstraction for time.
//!
//! The link only needs a monotonic clock and a way to pause. Production uses
//! [`SystemEnv`]; the simulation harness advances a virtual clock instead of
//! sleeping.

use std::time::{Duration, Instant};

/// Clock and delay provider.
pub trait Environment {
    /// Monotonic time since the node started.
    fn now(&self) -> Duration;

    /// Block for `duration`.
    fn delay(&self, duration: Duration);
}

impl<E: Environment + ?Sized> Environment for &E {
    fn now(&self) -> Duration {
        (**self).now()
    }

    fn delay(&self, duration: Duration) {
        (**self).delay(duration);
    }
}

/// Wall-clock environment backed by [`std::time::Instant`] and
/// [`std::thread::sleep`].
#[derive(Debug, Clone, Copy)]
pub struct SystemEnv {
    start: Instant,
}

impl SystemEnv {
    /// Start the clock now.
    #[allow(clippy::disallowed_methods)]
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn delay(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
