//! The dryer appliance's firmware core: sensor aggregation, PID-driven
//! heater control, an independent latched safety monitor, and the cycle
//! state machine, all driven by a single cooperative `tick` call rather
//! than interrupts or an RTOS scheduler.
//!
//! Every component here is `no_std`-agnostic at the trait level but depends
//! on [`thermal`]'s `std` feature and on [`persistence::Store`], so this
//! crate itself is `std`-only. A caller on bare metal wires its own
//! [`sensors::ChamberSensor`], [`sensors::HeaterSensor`], [`heater::HeaterDriver`],
//! [`heater::SoundPlayer`] and [`persistence::Filesystem`] impls and drives
//! [`orchestrator::Orchestrator::tick`] from its main loop.

pub mod aggregator;
pub mod error;
pub mod heater;
pub mod limits;
pub mod observer;
pub mod orchestrator;
pub mod safety;
pub mod sensors;

pub use aggregator::{ChamberDataEvent, HeaterTempEvent, SensorAggregator, SensorErrorEvent, SensorKind};
pub use error::SensorError;
pub use heater::{HeaterDriver, NoopSound, SoundPlayer};
pub use observer::Subscribers;
pub use orchestrator::{CycleState, Orchestrator, Stats};
pub use safety::{Emergency, SafetyMonitor};
pub use sensors::{ChamberSensor, HeaterSensor, SensorReading};
