//! Every literal constant named in the external interface, gathered in one
//! place so the implementation, the test suite, and the simulation harness
//! all reference the same numbers instead of re-deriving magic constants.

use persistence::models::{CustomPreset, PidProfileName, Preset};

pub const HEATER_TEMP_INTERVAL_MS: u64 = 500;
pub const BOX_DATA_INTERVAL_MS: u64 = 2_000;
pub const PID_UPDATE_INTERVAL_MS: u64 = 500;
pub const STATE_SAVE_INTERVAL_MS: u64 = 60_000;
pub const SENSOR_TIMEOUT_MS: u64 = 5_000;
pub const HEATER_CONVERSION_MS: u64 = 750;

/// A sensor is demoted to invalid after this many consecutive read failures.
pub const MAX_SENSOR_RETRIES: u32 = 3;

pub const MIN_TEMP: f32 = 30.0;
pub const MAX_BOX_TEMP: f32 = 80.0;
pub const MAX_HEATER_TEMP: f32 = 90.0;
pub const DEFAULT_MAX_OVERSHOOT: f32 = 10.0;
pub const MIN_TIME: u32 = 600;
pub const MAX_TIME: u32 = 36_000;
pub const PID_TEMP_SLOWDOWN_MARGIN: f32 = 15.0;
pub const TEMP_SLOWDOWN_MARGIN: f32 = 10.0;
pub const PWM_MAX: u8 = 100;
pub const PWM_MAX_PID_OUTPUT: f32 = 100.0;

pub const HEATER_TEMP_RANGE: (f32, f32) = (-50.0, 150.0);
pub const CHAMBER_TEMP_RANGE: (f32, f32) = (-40.0, 80.0);
pub const CHAMBER_HUMIDITY_RANGE: (f32, f32) = (0.0, 100.0);

/// The concrete (target, duration, overshoot) triple of a preset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetValues {
    pub temp: f32,
    pub time: u32,
    pub overshoot: f32,
}

pub fn preset_values(preset: Preset, custom: &CustomPreset) -> PresetValues {
    match preset {
        Preset::Pla => PresetValues { temp: 50.0, time: 14_400, overshoot: 10.0 },
        Preset::Petg => PresetValues { temp: 65.0, time: 18_000, overshoot: 10.0 },
        Preset::Custom => PresetValues {
            temp: custom.temp,
            time: custom.time,
            overshoot: custom.overshoot,
        },
    }
}

/// Clamps a custom preset's triple into the invariants from §3: MIN_TEMP ≤
/// temp ≤ MAX_BOX_TEMP, MIN_TIME ≤ time ≤ MAX_TIME, 0 ≤ overshoot ≤
/// DEFAULT_MAX_OVERSHOOT.
pub fn clamp_custom_preset(custom: CustomPreset) -> CustomPreset {
    CustomPreset {
        temp: custom.temp.clamp(MIN_TEMP, MAX_BOX_TEMP),
        time: custom.time.clamp(MIN_TIME, MAX_TIME),
        overshoot: custom.overshoot.clamp(0.0, DEFAULT_MAX_OVERSHOOT),
    }
}

/// The concrete (kp, ki, kd) triple of a PID profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGainsTriple {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

pub fn pid_gains(profile: PidProfileName) -> PidGainsTriple {
    match profile {
        PidProfileName::Soft => PidGainsTriple { kp: 2.5, ki: 0.015, kd: 8.0 },
        PidProfileName::Normal => PidGainsTriple { kp: 4.0, ki: 0.03, kd: 12.0 },
        PidProfileName::Strong => PidGainsTriple { kp: 6.0, ki: 0.05, kd: 15.0 },
    }
}
