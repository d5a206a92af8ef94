//! An independent safety monitor: latched, edge-triggered, and unaware of
//! the PID controller or the orchestrator's state machine, per `spec.md`
//! §4.3.

use thermal::LatchedLimit;

use crate::limits::SENSOR_TIMEOUT_MS;
use crate::observer::Subscribers;

/// A fired emergency: a human-readable reason naming the offending value and
/// the limit it crossed, or the sensor that went silent.
#[derive(Debug, Clone, PartialEq)]
pub struct Emergency {
    pub reason: String,
}

/// Observes heater and chamber temperature notifications independently of
/// the control loop and latches a one-shot emergency on an over-limit
/// reading or a stale sensor.
pub struct SafetyMonitor {
    max_heater: LatchedLimit<f32>,
    max_box: LatchedLimit<f32>,
    heater_last: Option<(f32, u64)>,
    box_last: Option<(f32, u64)>,
    fired: bool,
    fired_reason: Option<String>,
    subscribers: Subscribers<Emergency>,
}

impl SafetyMonitor {
    pub fn new(max_heater: f32, max_box: f32) -> Self {
        Self {
            max_heater: LatchedLimit::new(max_heater),
            max_box: LatchedLimit::new(max_box),
            heater_last: None,
            box_last: None,
            fired: false,
            fired_reason: None,
            subscribers: Subscribers::new(),
        }
    }

    /// Re-arms the monitor. Called from the orchestrator's `begin`.
    pub fn begin(&mut self) {
        self.max_heater.rearm();
        self.max_box.rearm();
        self.heater_last = None;
        self.box_last = None;
        self.fired = false;
        self.fired_reason = None;
    }

    pub fn set_max_heater(&mut self, value: f32) {
        self.max_heater.set_limit(value);
    }

    pub fn set_max_box(&mut self, value: f32) {
        self.max_box.set_limit(value);
    }

    pub fn subscribe(&mut self, handler: impl FnMut(&Emergency) + 'static) {
        self.subscribers.subscribe(handler);
    }

    fn fire(&mut self, reason: String) {
        if self.fired {
            return;
        }
        self.fired = true;
        self.fired_reason = Some(reason.clone());
        let emergency = Emergency { reason };
        self.subscribers.dispatch(&emergency);
    }

    /// The reason recorded by whichever condition fired first, if any.
    pub fn fired_reason(&self) -> Option<&str> {
        self.fired_reason.as_deref()
    }

    pub fn notify_heater(&mut self, temp: f32, ts: u64) {
        self.heater_last = Some((temp, ts));
        if self.max_heater.observe(temp) {
            let limit = self.max_heater.limit();
            self.fire(format!("heater over-temperature: {temp:.1} >= {limit:.1}"));
        }
    }

    pub fn notify_box(&mut self, temp: f32, ts: u64) {
        self.box_last = Some((temp, ts));
        if self.max_box.observe(temp) {
            let limit = self.max_box.limit();
            self.fire(format!("box over-temperature: {temp:.1} >= {limit:.1}"));
        }
    }

    /// Checks for stale sensors. Gated on having observed at least one valid
    /// reading, so a cold boot — before any sensor has reported — never
    /// trips the timeout.
    pub fn tick(&mut self, now: u64) {
        if let Some((_, ts)) = self.heater_last {
            if now.saturating_sub(ts) > SENSOR_TIMEOUT_MS {
                self.fire("Heater sensor timeout".to_string());
            }
        }
        if let Some((_, ts)) = self.box_last {
            if now.saturating_sub(ts) > SENSOR_TIMEOUT_MS {
                self.fire("Box sensor timeout".to_string());
            }
        }
    }

    pub fn is_emergency(&self) -> bool {
        self.fired
    }
}
