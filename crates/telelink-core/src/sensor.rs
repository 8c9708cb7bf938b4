//! Temperature sensor abstraction.

use std::fmt;

/// Offset of the internal temperature sensor calibration.
pub const ADC_OFFSET: f32 = 324.31;

/// Gain of the internal temperature sensor calibration, ADC counts per degree.
pub const ADC_GAIN: f32 = 1.22;

/// Source of raw temperature readings.
pub trait TemperatureSensor {
    /// One raw ADC conversion.
    fn read_raw(&mut self) -> u16;

    /// One calibrated reading.
    fn read(&mut self) -> Celsius {
        Celsius::from_raw_adc(self.read_raw())
    }
}

/// Temperature in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Celsius(pub f32);

impl Celsius {
    /// Apply the empirical linear calibration to a raw ADC reading.
    pub fn from_raw_adc(raw: u16) -> Self {
        Self((f32::from(raw) - ADC_OFFSET) / ADC_GAIN)
    }

    /// The single payload byte sent in a MSG packet.
    ///
    /// Truncates toward zero and saturates to `0..=255`.
    pub fn to_payload(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Celsius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}°C", self.0)
    }
}

/// Sensor that always returns the same raw reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSensor(pub u16);

impl TemperatureSensor for FixedSensor {
    fn read_raw(&mut self) -> u16 {
        self.0
    }
}
