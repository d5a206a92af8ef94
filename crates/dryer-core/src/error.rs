use thiserror::Error;

/// An error reported by a sensor capability. Callers generally don't match
/// on the exact variant — a few consecutive failures of any kind are enough
/// to demote a reading to invalid, per the sensor aggregator's retry policy.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum SensorError {
    #[error("sensor read failed")]
    ReadFailed,
    #[error("sensor reading {value} is out of range")]
    OutOfRange { value: f32 },
    #[error("sensor conversion not ready")]
    NotReady,
}
