//! Fake peripherals driving `dryer-core` without real hardware.
//!
//! Every fake is a plain struct with setters the test drives directly —
//! there is no background thread or async task standing in for the MCU, in
//! keeping with the cooperative, single-threaded model the core itself
//! uses.

use std::cell::RefCell;
use std::collections::HashMap;

use dryer_core::{ChamberSensor, HeaterDriver, HeaterSensor, SensorError, SoundPlayer};
use persistence::{Filesystem, PersistenceError};

/// A chamber sensor whose last reading is set directly by the test driving
/// the simulation, rather than computed from a formula — this keeps a
/// scenario's temperature profile readable at the call site instead of
/// buried in a curve-fitting helper.
#[derive(Debug, Clone, Copy)]
pub struct FakeChamberSensor {
    temp: f32,
    humidity: f32,
    fail_reads: bool,
}

impl FakeChamberSensor {
    pub fn new(temp: f32, humidity: f32) -> Self {
        Self { temp, humidity, fail_reads: false }
    }

    pub fn set(&mut self, temp: f32, humidity: f32) {
        self.temp = temp;
        self.humidity = humidity;
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.fail_reads = failing;
    }
}

impl ChamberSensor for FakeChamberSensor {
    fn begin(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn read(&mut self) -> Result<(f32, f32), SensorError> {
        if self.fail_reads {
            Err(SensorError::ReadFailed)
        } else {
            Ok((self.temp, self.humidity))
        }
    }
}

/// A heater sensor that completes a conversion on the tick right after it
/// is requested, which is the fastest a real `HeaterTempInterval` scheduler
/// could observe — good enough fidelity for scenario tests that care about
/// the eventual reading, not the exact conversion latency.
#[derive(Debug, Clone, Copy)]
pub struct FakeHeaterSensor {
    temp: f32,
    fail_reads: bool,
}

impl FakeHeaterSensor {
    pub fn new(temp: f32) -> Self {
        Self { temp, fail_reads: false }
    }

    pub fn set(&mut self, temp: f32) {
        self.temp = temp;
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.fail_reads = failing;
    }
}

impl HeaterSensor for FakeHeaterSensor {
    fn begin(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn request_conversion(&mut self) -> Result<(), SensorError> {
        if self.fail_reads {
            Err(SensorError::ReadFailed)
        } else {
            Ok(())
        }
    }

    fn is_conversion_ready(&self) -> bool {
        true
    }

    fn retrieve(&mut self) -> Result<f32, SensorError> {
        if self.fail_reads {
            Err(SensorError::ReadFailed)
        } else {
            Ok(self.temp)
        }
    }
}

/// A heater driver that just records its commanded state.
#[derive(Debug, Default, Clone, Copy)]
pub struct FakeHeaterDriver {
    running: bool,
    pwm: u8,
    emergency_stopped: bool,
}

impl FakeHeaterDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn was_emergency_stopped(&self) -> bool {
        self.emergency_stopped
    }
}

impl HeaterDriver for FakeHeaterDriver {
    fn begin(&mut self, _now: u64) {}

    fn start(&mut self, _now: u64) {
        self.running = true;
    }

    fn stop(&mut self, _now: u64) {
        self.running = false;
    }

    fn emergency_stop(&mut self) {
        self.running = false;
        self.pwm = 0;
        self.emergency_stopped = true;
    }

    fn set_pwm(&mut self, duty: u8) {
        self.pwm = duty;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn current_pwm(&self) -> u8 {
        self.pwm
    }
}

/// Records every sound cue the orchestrator asks for, so a scenario test
/// can assert on cycle transitions without inspecting private state.
#[derive(Debug, Default, Clone)]
pub struct RecordingSound {
    pub started: u32,
    pub finished: u32,
    pub alarmed: u32,
}

impl SoundPlayer for RecordingSound {
    fn play_start(&mut self) {
        self.started += 1;
    }

    fn play_finished(&mut self) {
        self.finished += 1;
    }

    fn play_alarm(&mut self) {
        self.alarmed += 1;
    }
}

/// An in-memory filesystem standing in for the flash-backed store.
#[derive(Debug, Default)]
pub struct FakeFilesystem {
    files: RefCell<HashMap<String, Vec<u8>>>,
    mount_fails: bool,
}

impl FakeFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_mount() -> Self {
        Self { files: RefCell::new(HashMap::new()), mount_fails: true }
    }
}

impl Filesystem for FakeFilesystem {
    fn mount(&mut self) -> Result<(), PersistenceError> {
        if self.mount_fails {
            Err(PersistenceError::MountFailed("simulated mount failure".to_string()))
        } else {
            Ok(())
        }
    }

    fn read(&self, path: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.files.borrow().get(path).cloned())
    }

    fn write(&mut self, path: &str, contents: &[u8]) -> Result<(), PersistenceError> {
        self.files.borrow_mut().insert(path.to_string(), contents.to_vec());
        Ok(())
    }

    fn remove(&mut self, path: &str) -> Result<(), PersistenceError> {
        self.files.borrow_mut().remove(path);
        Ok(())
    }
}
