//! A deterministic, synchronous simulation harness for `dryer-core`.
//!
//! Every collaborator here is a plain, directly-driven fake — there is no
//! background thread, no async runtime, and no wall clock. A scenario test
//! owns a [`SimClock`] and a set of fakes, advances both explicitly, and
//! asserts on the [`dryer_core::Stats`] the orchestrator returns from each
//! `tick`.

pub mod clock;
pub mod fakes;

pub use clock::SimClock;
pub use fakes::{FakeChamberSensor, FakeFilesystem, FakeHeaterDriver, FakeHeaterSensor, RecordingSound};
