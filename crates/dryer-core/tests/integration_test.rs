//! Cross-module scenarios driving the orchestrator end to end against fake
//! sensors, a fake heater, and an in-memory filesystem.

use std::cell::RefCell;
use std::collections::HashMap;

use dryer_core::{
    ChamberSensor, CycleState, HeaterDriver, HeaterSensor, NoopSound, Orchestrator, SensorError,
};
use persistence::models::{Preset, StateName};
use persistence::{Filesystem, PersistenceError, Store};

#[derive(Default)]
struct MemFs {
    files: RefCell<HashMap<String, Vec<u8>>>,
}

impl Filesystem for MemFs {
    fn mount(&mut self) -> Result<(), PersistenceError> {
        Ok(())
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

struct ConstantChamber {
    temp: f32,
    humidity: f32,
}

impl ChamberSensor for ConstantChamber {
    fn begin(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
    fn read(&mut self) -> Result<(f32, f32), SensorError> {
        Ok((self.temp, self.humidity))
    }
}

/// A heater sensor that tracks chamber temp plus a small offset, so a full
/// cycle can be driven without the PID output ever being physically bogus.
struct TrackingHeater {
    temp: f32,
}

impl HeaterSensor for TrackingHeater {
    fn begin(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
    fn request_conversion(&mut self) -> Result<(), SensorError> {
        Ok(())
    }
    fn is_conversion_ready(&self) -> bool {
        true
    }
    fn retrieve(&mut self) -> Result<f32, SensorError> {
        Ok(self.temp)
    }
}

#[derive(Default)]
struct FakeHeaterDriver {
    running: bool,
    pwm: u8,
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

type TestOrchestrator = Orchestrator<ConstantChamber, TrackingHeater, FakeHeaterDriver, NoopSound, MemFs>;

fn fresh_orchestrator(chamber_temp: f32, heater_temp: f32) -> TestOrchestrator {
    let mut store = Store::new(MemFs::default());
    store.begin().unwrap();
    Orchestrator::new(
        ConstantChamber { temp: chamber_temp, humidity: 35.0 },
        TrackingHeater { temp: heater_temp },
        FakeHeaterDriver::default(),
        NoopSound,
        store,
    )
}

#[test]
fn happy_path_pla_cycle_reaches_finished() {
    let mut orch = fresh_orchestrator(25.0, 30.0);
    orch.begin(0);
    orch.start();
    assert_eq!(orch.state(), CycleState::Running);

    let mut now = 0u64;
    let mut last_stats = orch.stats_now();
    while orch.state() == CycleState::Running && now < 14_400_000 + 60_000 {
        now += 500;
        last_stats = orch.tick(now);
    }

    assert_eq!(orch.state(), CycleState::Finished);
    assert_eq!(last_stats.preset, Preset::Pla);
}

#[test]
fn heater_over_temperature_latches_the_cycle_into_failed() {
    let mut orch = fresh_orchestrator(25.0, 120.0);
    orch.begin(0);
    orch.start();

    let mut now = 0u64;
    for _ in 0..5 {
        now += 500;
        orch.tick(now);
    }

    assert_eq!(orch.state(), CycleState::Failed);
}

#[test]
fn stopping_a_running_cycle_clears_snapshot_and_returns_to_ready() {
    let mut orch = fresh_orchestrator(25.0, 30.0);
    orch.begin(0);
    orch.start();
    orch.tick(1_000);
    orch.stop();

    assert_eq!(orch.state(), CycleState::Ready);
    assert_eq!(orch.stats_now().elapsed, 0);
}

#[test]
fn power_recovery_resumes_a_running_snapshot_on_the_next_boot() {
    let mut store = Store::new(MemFs::default());
    store.begin().unwrap();
    store.save_runtime_state(StateName::Running, 1_800, 50.0, 14_400, Preset::Pla, 500);

    let mut orch = Orchestrator::new(
        ConstantChamber { temp: 25.0, humidity: 35.0 },
        TrackingHeater { temp: 30.0 },
        FakeHeaterDriver::default(),
        NoopSound,
        store,
    );
    orch.begin(1_800_000);
    assert_eq!(orch.state(), CycleState::PowerRecovered);

    orch.start();
    assert_eq!(orch.state(), CycleState::Running);
    assert_eq!(orch.stats_now().elapsed, 1_800);
}
