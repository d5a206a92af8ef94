#![cfg_attr(not(feature = "std"), no_std)]

//! # Thermal Control Primitives
//!
//! `thermal` provides the numeric building blocks for closed-loop temperature
//! control: a PID controller tuned for chamber/heater-style two-body systems,
//! a signal filter used for derivative and cooling-rate smoothing, and a
//! latched over-limit detector.
//!
//! This crate knows nothing about sensors, drivers, or persistence — it only
//! operates on plain floating-point values and timestamps, so it can be used
//! both in `no_std` firmware and in host-side simulation and tests.
//!
//! ## Features
//!
//! - **PID controller**: anti-windup, derivative filtering on measurement, a
//!   predictive term for a fast-cooling process variable, and a two-phase
//!   output ceiling driven by a secondary (actuator) temperature.
//! - **Signal filtering**: a low-pass filter used for derivative and
//!   cooling-rate smoothing.
//! - **Latched limit detector**: a one-shot over-limit latch, the building
//!   block for a safety monitor.
//! - **`no_std` support**: usable in bare-metal environments.
//! - **Optional `serde` support**: for serializing controller configuration.

pub mod filter;
pub mod limit;
pub mod pid;

pub use filter::{Filter, LowPassFilter};
pub use limit::LatchedLimit;
pub use pid::{HeaterCeiling, Pid, PidGains};
