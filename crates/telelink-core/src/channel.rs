//! Channel access guard.
//!
//! Before every transmission the radio listens briefly so carrier detect can
//! settle, then drops back to idle and samples the carrier flag. A busy
//! channel means someone else is transmitting: stale receive data is dropped
//! and the probe repeats after a short backoff.
//!
//! By default there is no cap on probes, so a channel that never clears
//! blocks the caller forever. Set a cap with
//! [`ChannelGuard::with_max_attempts`] to turn that into
//! [`LinkError::ChannelBusy`].

use std::{num::NonZeroU32, time::Duration};

use tracing::{debug, trace, warn};

use crate::{env::Environment, error::LinkError, radio::Radio};

/// Carrier-sense guard run before each transmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelGuard {
    settle: Duration,
    backoff: Duration,
    max_attempts: Option<NonZeroU32>,
}

impl ChannelGuard {
    /// Guard with the given listening window and busy backoff, retrying
    /// forever.
    pub const fn new(settle: Duration, backoff: Duration) -> Self {
        Self { settle, backoff, max_attempts: None }
    }

    /// Cap the number of probes. `None` retries forever.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: Option<NonZeroU32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Configured probe cap.
    pub const fn max_attempts(&self) -> Option<NonZeroU32> {
        self.max_attempts
    }

    /// Probe the channel once.
    ///
    /// Leaves the radio out of listening mode. Returns `true` when no
    /// carrier was detected.
    pub fn probe<R: Radio, E: Environment>(&self, radio: &mut R, env: &E) -> bool {
        radio.start_listening();
        env.delay(self.settle);
        radio.stop_listening();
        !radio.carrier_detected()
    }

    /// Block until the channel is sensed clear.
    ///
    /// Returns the number of probes it took, `1` when the first probe found
    /// the channel clear.
    pub fn wait_for_clear_channel<R: Radio, E: Environment>(
        &self,
        radio: &mut R,
        env: &E,
    ) -> Result<u32, LinkError> {
        let mut attempts: u32 = 0;
        loop {
            attempts = attempts.saturating_add(1);

            if self.probe(radio, env) {
                trace!(attempts, "channel clear");
                return Ok(attempts);
            }

            debug!(attempts, "channel busy, backing off");

            if let Some(max) = self.max_attempts {
                if attempts >= max.get() {
                    radio.flush_rx();
                    warn!(attempts, "giving up on busy channel");
                    return Err(LinkError::ChannelBusy { attempts });
                }
            }

            env.delay(self.backoff);
            radio.flush_rx();
        }
    }
}
