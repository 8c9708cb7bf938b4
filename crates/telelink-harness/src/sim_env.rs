//! Virtual clock environment.

use std::{cell::Cell, rc::Rc, time::Duration};

use telelink_core::env::Environment;

/// Environment whose clock only moves when someone delays.
///
/// Clones share the same clock, so the radio and the node see the same time.
#[derive(Debug, Clone, Default)]
pub struct SimEnv {
    now: Rc<Cell<Duration>>,
}

impl SimEnv {
    /// Clock starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward without going through a delay.
    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }
}

impl Environment for SimEnv {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn delay(&self, duration: Duration) {
        self.advance(duration);
    }
}
