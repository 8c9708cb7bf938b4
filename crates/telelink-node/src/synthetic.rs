//! Synthetic temperature source for hosts without the on-chip sensor.

use rand::{Rng, SeedableRng, rngs::StdRng};
use telelink_core::sensor::TemperatureSensor;

/// Raw reading the walk starts from, about 25 °C.
pub const START_RAW: u16 = 355;

/// Lowest raw reading produced, about 4.7 °C.
pub const MIN_RAW: u16 = 330;

/// Highest raw reading produced, about 62 °C.
pub const MAX_RAW: u16 = 400;

/// Largest change between two consecutive readings.
pub const MAX_STEP: i32 = 2;

/// Seeded random walk over raw ADC counts.
#[derive(Debug)]
pub struct SyntheticSensor {
    rng: StdRng,
    raw: u16,
}

impl SyntheticSensor {
    /// Walk starting at [`START_RAW`]; equal seeds give equal readings.
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed), raw: START_RAW }
    }
}

impl TemperatureSensor for SyntheticSensor {
    fn read_raw(&mut self) -> u16 {
        let step = self.rng.gen_range(-MAX_STEP..=MAX_STEP);
        let next = (i32::from(self.raw) + step).clamp(i32::from(MIN_RAW), i32::from(MAX_RAW));
        self.raw = u16::try_from(next).unwrap_or(START_RAW);
        self.raw
    }
}
