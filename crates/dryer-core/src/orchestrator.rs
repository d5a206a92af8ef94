//! The dryer orchestrator: the cycle state machine, per `spec.md` §4.5.
//!
//! Every component below is owned exclusively by the orchestrator — per the
//! resource model in §5 there is exactly one owner and one thread, so there
//! is no `Arc<Mutex<_>>` anywhere in this crate. `SensorAggregator` and
//! `SafetyMonitor` expose a subscriber registry for genuinely external
//! observers (a UI, a test harness), but the orchestrator's own reaction to
//! fresh sensor data is wired by polling their cached readings once per
//! `tick` rather than registering itself as one more subscriber — a
//! component that owned a closure referencing its owner back would need a
//! reference cycle the borrow checker can't express. This is the concrete
//! realization of the "cycles in the object graph" design note in §9.

use persistence::models::{CustomPreset, PidProfileName, Preset, StateName};
use persistence::{Filesystem, Store};
use thermal::{HeaterCeiling, Pid, PidGains};

use crate::aggregator::SensorAggregator;
use crate::heater::{HeaterDriver, SoundPlayer};
use crate::limits::{self, clamp_custom_preset, pid_gains, preset_values};
use crate::safety::SafetyMonitor;
use crate::sensors::{ChamberSensor, HeaterSensor};

/// The cycle's current state, per `spec.md` §3 and the transition table in
/// §4.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Ready,
    Running,
    Paused,
    Finished,
    Failed,
    /// A paused-equivalent state entered at boot when a `RUNNING` snapshot
    /// is found; requires explicit `start` to resume heating.
    PowerRecovered,
}

/// Pushed to UI subscribers on every tick, per `spec.md` §4.5/§6.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub state: CycleState,
    pub heater_temp: f32,
    pub target_temp: f32,
    pub chamber_temp: f32,
    pub chamber_humidity: f32,
    pub elapsed: u32,
    pub remaining: u32,
    pub last_pwm: u8,
    pub preset: Preset,
}

/// The dryer orchestrator: owns the sensor aggregator, safety monitor,
/// heater driver, sound player, persistence store, and PID controller, and
/// holds the cycle state machine over all of them.
pub struct Orchestrator<C, H, D, S, FS>
where
    C: ChamberSensor,
    H: HeaterSensor,
    D: HeaterDriver,
    S: SoundPlayer,
    FS: Filesystem,
{
    aggregator: SensorAggregator<C, H>,
    safety: SafetyMonitor,
    heater: D,
    sound: S,
    store: Store<FS>,
    pid: Pid<f32>,

    state: CycleState,
    start_time: u64,
    paused_at: u64,
    total_paused: u64,
    last_snapshot_time: u64,
    now: u64,

    target_temp: f32,
    target_time: u32,
    overshoot: f32,
    active_preset: Preset,

    last_seen_heater_ts: Option<u64>,
    last_seen_chamber_ts: Option<u64>,
    emergency_reason: Option<String>,
    last_pwm: u8,
}

impl<C, H, D, S, FS> Orchestrator<C, H, D, S, FS>
where
    C: ChamberSensor,
    H: HeaterSensor,
    D: HeaterDriver,
    S: SoundPlayer,
    FS: Filesystem,
{
    pub fn new(chamber: C, heater_sensor: H, heater: D, sound: S, store: Store<FS>) -> Self {
        let settings = store.settings().clone();
        let values = preset_values(settings.selected_preset, &settings.custom_preset);
        let gains = pid_gains(settings.pid_profile);
        let max_allowed = values.temp + values.overshoot;

        let pid = Pid::new(
            PidGains::new(gains.kp, gains.ki, gains.kd),
            0.0,
            limits::PWM_MAX_PID_OUTPUT,
            max_allowed,
            HeaterCeiling::new(limits::PID_TEMP_SLOWDOWN_MARGIN, values.overshoot, limits::TEMP_SLOWDOWN_MARGIN),
        );

        Self {
            aggregator: SensorAggregator::new(chamber, heater_sensor),
            safety: SafetyMonitor::new(max_allowed, limits::MAX_BOX_TEMP),
            heater,
            sound,
            store,
            pid,
            state: CycleState::Ready,
            start_time: 0,
            paused_at: 0,
            total_paused: 0,
            last_snapshot_time: 0,
            now: 0,
            target_temp: values.temp,
            target_time: values.time,
            overshoot: values.overshoot,
            active_preset: settings.selected_preset,
            last_seen_heater_ts: None,
            last_seen_chamber_ts: None,
            emergency_reason: None,
            last_pwm: 0,
        }
    }

    /// Initializes every owned component and recovers a persisted
    /// in-progress cycle, per `spec.md` §4.5 "Recovery".
    pub fn begin(&mut self, now: u64) {
        self.now = now;
        let _ = self.aggregator.begin();
        self.safety.begin();
        self.heater.begin(now);

        if let Some(snapshot) = self.store.runtime_state().cloned() {
            if snapshot.state == StateName::Running {
                self.active_preset = snapshot.preset;
                self.target_temp = snapshot.target_temp;
                self.target_time = snapshot.target_time;
                let settings = self.store.settings();
                self.overshoot = preset_values(self.active_preset, &settings.custom_preset).overshoot;
                self.start_time = now.saturating_sub(u64::from(snapshot.elapsed) * 1000);
                self.total_paused = 0;
                self.apply_active_tuning();
                self.state = CycleState::PowerRecovered;
                return;
            }
        }
        self.state = CycleState::Ready;
    }

    fn apply_active_tuning(&mut self) {
        let max_allowed = self.target_temp + self.overshoot;
        self.pid.set_max_allowed_temp(max_allowed);
        self.pid.set_ceiling(HeaterCeiling::new(
            limits::PID_TEMP_SLOWDOWN_MARGIN,
            self.overshoot,
            limits::TEMP_SLOWDOWN_MARGIN,
        ));
        self.safety.set_max_heater(max_allowed);
        self.safety.set_max_box(limits::MAX_BOX_TEMP);
    }

    fn elapsed(&self) -> u32 {
        if self.state == CycleState::Ready {
            return 0;
        }
        if self.state == CycleState::Finished {
            return self.target_time;
        }
        let running_since_start = self.now.saturating_sub(self.start_time);
        let elapsed_ms = running_since_start.saturating_sub(self.total_paused);
        let elapsed_s = (elapsed_ms / 1000) as u32;
        elapsed_s.min(self.target_time)
    }

    fn remaining(&self) -> u32 {
        self.target_time.saturating_sub(self.elapsed())
    }

    /// The main cooperative-loop entry point. Advances every owned
    /// component, runs the state machine, and returns the stats snapshot
    /// for this tick.
    pub fn tick(&mut self, now: u64) -> Stats {
        self.now = now;

        self.aggregator.tick(now);
        self.react_to_fresh_sensor_data();
        self.safety.tick(now);
        if self.safety.is_emergency() && self.state != CycleState::Failed {
            let reason = self
                .safety
                .fired_reason()
                .map(str::to_string)
                .unwrap_or_else(|| "safety monitor fired".to_string());
            self.enter_failed(reason);
        }

        if self.state == CycleState::Running {
            if self.elapsed() >= self.target_time {
                self.finish();
            } else if now.saturating_sub(self.last_snapshot_time) >= limits::STATE_SAVE_INTERVAL_MS {
                self.persist_running_snapshot();
            }
        }

        self.stats()
    }

    fn react_to_fresh_sensor_data(&mut self) {
        let heater = self.aggregator.heater_reading();
        if heater.valid && Some(heater.timestamp) != self.last_seen_heater_ts {
            self.last_seen_heater_ts = Some(heater.timestamp);
            self.safety.notify_heater(heater.value, heater.timestamp);
            if self.state == CycleState::Running {
                let chamber = self.aggregator.chamber_temp();
                let pwm = self.pid.compute(self.target_temp, chamber.value, heater.value, heater.timestamp);
                self.last_pwm = pwm.round().clamp(0.0, f32::from(limits::PWM_MAX)) as u8;
                self.heater.set_pwm(self.last_pwm);
            }
        }

        let chamber = self.aggregator.chamber_temp();
        if chamber.valid && Some(chamber.timestamp) != self.last_seen_chamber_ts {
            self.last_seen_chamber_ts = Some(chamber.timestamp);
            self.safety.notify_box(chamber.value, chamber.timestamp);
        }

        if self.state != CycleState::Running && self.heater.current_pwm() != 0 {
            self.heater.set_pwm(0);
            self.last_pwm = 0;
        }
    }

    fn stats(&self) -> Stats {
        Stats {
            state: self.state,
            heater_temp: self.aggregator.heater_reading().value,
            target_temp: self.target_temp,
            chamber_temp: self.aggregator.chamber_temp().value,
            chamber_humidity: self.aggregator.chamber_humidity().value,
            elapsed: self.elapsed(),
            remaining: self.remaining(),
            last_pwm: self.last_pwm,
            preset: self.active_preset,
        }
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    pub fn stats_now(&self) -> Stats {
        self.stats()
    }

    /// Exposes the owned sensor capabilities for a simulation harness to
    /// drive directly — the orchestrator otherwise has no notion of
    /// "setting" a sensor reading, only of polling one on schedule.
    pub fn with_sensors_mut(&mut self, f: impl FnOnce(&mut C, &mut H)) {
        let (chamber, heater) = self.aggregator.sensors_mut();
        f(chamber, heater);
    }

    // ---- user commands -------------------------------------------------
    //
    // Per `spec.md` §7, a command illegal in the current state is silently
    // ignored: the UI is authoritative over button meaning, not state
    // legality.

    pub fn start(&mut self) {
        match self.state {
            CycleState::Ready => {
                self.start_time = self.now;
                self.total_paused = 0;
                self.begin_running();
            }
            // `begin` already set `start_time`/`total_paused` so elapsed
            // continues from the recovered snapshot rather than resetting.
            CycleState::PowerRecovered => self.begin_running(),
            _ => {}
        }
    }

    fn begin_running(&mut self) {
        self.pid.reset();
        self.apply_active_tuning();
        self.heater.start(self.now);
        self.state = CycleState::Running;
        self.sound.play_start();
        self.persist_running_snapshot();
    }

    pub fn pause(&mut self) {
        if self.state == CycleState::Running {
            self.heater.stop(self.now);
            self.heater.set_pwm(0);
            self.last_pwm = 0;
            self.paused_at = self.now;
            self.state = CycleState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == CycleState::Paused {
            self.total_paused += self.now.saturating_sub(self.paused_at);
            self.heater.start(self.now);
            self.state = CycleState::Running;
        }
    }

    pub fn stop(&mut self) {
        if matches!(self.state, CycleState::Running | CycleState::Paused) {
            self.heater.stop(self.now);
            self.heater.set_pwm(0);
            self.last_pwm = 0;
            self.start_time = 0;
            self.total_paused = 0;
            self.state = CycleState::Ready;
        }
    }

    pub fn reset(&mut self) {
        self.heater.stop(self.now);
        self.heater.set_pwm(0);
        self.start_time = 0;
        self.total_paused = 0;
        self.emergency_reason = None;
        self.store.clear_runtime_state();
        self.state = CycleState::Ready;
    }

    fn finish(&mut self) {
        self.heater.stop(self.now);
        self.heater.set_pwm(0);
        self.last_pwm = 0;
        self.pid.reset();
        self.store.clear_runtime_state();
        self.state = CycleState::Finished;
        self.sound.play_finished();
    }

    fn enter_failed(&mut self, reason: String) {
        self.heater.emergency_stop();
        self.last_pwm = 0;
        self.pid.reset();
        self.emergency_reason = Some(reason.clone());
        self.store.save_emergency_state(&reason, (self.now / 1000) as u32);
        self.state = CycleState::Failed;
        self.sound.play_alarm();
    }

    fn persist_running_snapshot(&mut self) {
        self.last_snapshot_time = self.now;
        self.store.save_runtime_state(
            StateName::Running,
            self.elapsed(),
            self.target_temp,
            self.target_time,
            self.active_preset,
            (self.now / 1000) as u32,
        );
    }

    /// Moves the implicit finish time by `delta_seconds` (only while
    /// `RUNNING`), clamping the resulting duration into `[MIN_TIME,
    /// MAX_TIME]`.
    pub fn adjust_remaining(&mut self, delta_seconds: i64) {
        if self.state != CycleState::Running {
            return;
        }
        let elapsed = self.elapsed();
        let new_duration = (i64::from(self.target_time) - delta_seconds)
            .clamp(i64::from(limits::MIN_TIME), i64::from(limits::MAX_TIME)) as u32;
        self.target_time = new_duration;
        // Recompute start_time so elapsed stays the same under the new
        // duration — adjust_remaining only moves the finish line, not the
        // cycle's progress.
        self.start_time = self.now.saturating_sub(self.total_paused).saturating_sub(u64::from(elapsed) * 1000);
    }

    // ---- settings passthrough -------------------------------------------

    pub fn select_preset(&mut self, preset: Preset) {
        self.active_preset = preset;
        self.store.set_selected_preset(preset);
        self.refresh_active_from_settings();
    }

    pub fn set_custom_preset(&mut self, custom: CustomPreset) {
        let clamped = clamp_custom_preset(custom);
        self.store.set_custom_preset(clamped);
        if self.active_preset == Preset::Custom {
            self.refresh_active_from_settings();
        }
    }

    pub fn set_pid_profile(&mut self, profile: PidProfileName) {
        self.store.set_pid_profile(profile);
        let gains = pid_gains(profile);
        self.pid.set_gains(PidGains::new(gains.kp, gains.ki, gains.kd));
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.store.set_sound_enabled(enabled);
    }

    fn refresh_active_from_settings(&mut self) {
        let settings = self.store.settings().clone();
        let values = preset_values(settings.selected_preset, &settings.custom_preset);
        self.target_temp = values.temp;
        self.target_time = values.time;
        self.overshoot = values.overshoot;
        self.apply_active_tuning();
    }

    pub fn emergency_reason(&self) -> Option<&str> {
        self.emergency_reason.as_deref()
    }
}
