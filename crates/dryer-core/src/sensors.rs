//! Sensor capability traits.
//!
//! These are thin drivers, not caches: the [`crate::aggregator::SensorAggregator`]
//! owns the cached `(value, timestamp, valid)` triples and the heater's
//! conversion state machine. A capability implementation only knows how to
//! talk to one physical sensor.

use crate::error::SensorError;

/// A cached sensor reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub value: f32,
    pub timestamp: u64,
    pub valid: bool,
}

impl SensorReading {
    pub const fn invalid() -> Self {
        Self { value: 0.0, timestamp: 0, valid: false }
    }
}

impl Default for SensorReading {
    fn default() -> Self {
        Self::invalid()
    }
}

/// The chamber temperature/humidity sensor. Reads are synchronous.
pub trait ChamberSensor {
    fn begin(&mut self) -> Result<(), SensorError>;

    /// Returns `(temperature_c, humidity_pct)`.
    fn read(&mut self) -> Result<(f32, f32), SensorError>;
}

/// The heater element's temperature sensor, modeled as an explicit two-state
/// conversion machine (request, then poll) rather than a blocking read —
/// the aggregator drives the state transitions, this trait only performs
/// the underlying I/O for each one.
pub trait HeaterSensor {
    fn begin(&mut self) -> Result<(), SensorError>;
    fn request_conversion(&mut self) -> Result<(), SensorError>;
    fn is_conversion_ready(&self) -> bool;

    /// Retrieves the converted value. Only called once `is_conversion_ready`
    /// is true.
    fn retrieve(&mut self) -> Result<f32, SensorError>;
}
