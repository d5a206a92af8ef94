//! Durable record types and the domain enums they carry.
//!
//! Every record carries a `version` field; [`CURRENT_VERSION`] is the only
//! version this store understands. A record at any other version (including
//! zero, the default for a freshly-zeroed flash page) is treated as absent by
//! [`crate::store::Store`], not as an error — see `spec.md` §4.4 and §6.
//! Unknown enum values fall back to a named default rather than failing to
//! parse the whole record, so a single stray field can't strand a user's
//! settings.

use serde::{Deserialize, Serialize};

pub const CURRENT_VERSION: u8 = 1;

/// A named drying preset. `Custom` carries no payload here — its values live
/// in [`Settings::custom_preset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    #[default]
    Pla,
    Petg,
    Custom,
}

impl Preset {
    fn as_wire(self) -> &'static str {
        match self {
            Preset::Pla => "PLA",
            Preset::Petg => "PETG",
            Preset::Custom => "CUSTOM",
        }
    }

    fn from_wire(s: &str) -> Self {
        match s {
            "PETG" => Preset::Petg,
            "CUSTOM" => Preset::Custom,
            // Unknown enum value falls back to the default (PLA).
            _ => Preset::Pla,
        }
    }
}

impl Serialize for Preset {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Preset {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(Preset::from_wire(&String::deserialize(d)?))
    }
}

/// The named PID gain profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PidProfileName {
    Soft,
    #[default]
    Normal,
    Strong,
}

impl PidProfileName {
    fn as_wire(self) -> &'static str {
        match self {
            PidProfileName::Soft => "SOFT",
            PidProfileName::Normal => "NORMAL",
            PidProfileName::Strong => "STRONG",
        }
    }

    fn from_wire(s: &str) -> Self {
        match s {
            "SOFT" => PidProfileName::Soft,
            "STRONG" => PidProfileName::Strong,
            // Unknown enum value falls back to the default (NORMAL).
            _ => PidProfileName::Normal,
        }
    }
}

impl Serialize for PidProfileName {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for PidProfileName {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(PidProfileName::from_wire(&String::deserialize(d)?))
    }
}

/// The bare name of a cycle state, as persisted in the runtime snapshot. The
/// orchestrator's full `CycleState` carries additional in-memory fields
/// (start time, pause accounting, …) that never hit the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateName {
    #[default]
    Ready,
    Running,
    Paused,
    Finished,
    Failed,
}

impl StateName {
    fn as_wire(self) -> &'static str {
        match self {
            StateName::Ready => "READY",
            StateName::Running => "RUNNING",
            StateName::Paused => "PAUSED",
            StateName::Finished => "FINISHED",
            StateName::Failed => "FAILED",
        }
    }

    fn from_wire(s: &str) -> Self {
        match s {
            "RUNNING" => StateName::Running,
            "PAUSED" => StateName::Paused,
            "FINISHED" => StateName::Finished,
            "FAILED" => StateName::Failed,
            // Unknown enum value falls back to the default (READY).
            _ => StateName::Ready,
        }
    }
}

impl Serialize for StateName {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for StateName {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(StateName::from_wire(&String::deserialize(d)?))
    }
}

/// The user-editable `CUSTOM` preset's triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CustomPreset {
    pub temp: f32,
    pub time: u32,
    pub overshoot: f32,
}

/// User settings, mutated only by explicit user action and flushed
/// immediately on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub version: u8,
    pub custom_preset: CustomPreset,
    pub selected_preset: Preset,
    pub pid_profile: PidProfileName,
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            custom_preset: CustomPreset {
                temp: 50.0,
                time: 14_400,
                overshoot: 10.0,
            },
            selected_preset: Preset::Pla,
            pid_profile: PidProfileName::Normal,
            sound_enabled: true,
        }
    }
}

/// The runtime snapshot used to recover from power loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSnapshot {
    pub version: u8,
    pub state: StateName,
    pub elapsed: u32,
    pub target_temp: f32,
    pub target_time: u32,
    pub preset: Preset,
    pub timestamp: u32,
}
