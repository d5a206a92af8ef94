//! The durable store: a thin cache over a [`Filesystem`], with the self-heal
//! rules from `spec.md` §4.4 baked in.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::PersistenceError;
use crate::fs::Filesystem;
use crate::models::{CustomPreset, PidProfileName, Preset, RuntimeSnapshot, Settings, StateName, CURRENT_VERSION};

const SETTINGS_PATH: &str = "/settings.json";
const RUNTIME_PATH: &str = "/runtime.json";
const EMERGENCY_PATH: &str = "/emergency.txt";

trait Versioned {
    fn version(&self) -> u8;
}

impl Versioned for Settings {
    fn version(&self) -> u8 {
        self.version
    }
}

impl Versioned for RuntimeSnapshot {
    fn version(&self) -> u8 {
        self.version
    }
}

enum Loaded<T> {
    Found(T),
    Absent,
    Corrupt,
}

fn load<T: DeserializeOwned + Versioned>(fs: &impl Filesystem, path: &str) -> Loaded<T> {
    let bytes = match fs.read(path) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return Loaded::Absent,
        Err(_) => return Loaded::Corrupt,
    };
    match serde_json::from_slice::<T>(&bytes) {
        // A record at an unknown or zero version is treated as absent, not
        // as an error it has to self-heal from.
        Ok(value) if value.version() == 0 || value.version() != CURRENT_VERSION => Loaded::Absent,
        Ok(value) => Loaded::Found(value),
        Err(_) => Loaded::Corrupt,
    }
}

fn write_json<T: Serialize>(fs: &mut impl Filesystem, path: &str, value: &T) {
    match serde_json::to_vec(value) {
        Ok(bytes) => {
            if let Err(error) = fs.write(path, &bytes) {
                tracing::warn!(%path, %error, "failed to flush record to flash");
            }
        }
        Err(error) => tracing::warn!(%path, %error, "failed to serialize record"),
    }
}

/// A cached, self-healing store of user settings and runtime recovery state.
///
/// The orchestrator reads through the in-memory cache; every setter also
/// flushes to the filesystem immediately. A flush failure is logged but never
/// propagated — the appliance keeps running on its in-memory state and tries
/// again on the next write.
pub struct Store<FS: Filesystem> {
    fs: FS,
    healthy: bool,
    settings: Settings,
    runtime: Option<RuntimeSnapshot>,
}

impl<FS: Filesystem> Store<FS> {
    pub fn new(fs: FS) -> Self {
        Self {
            fs,
            healthy: false,
            settings: Settings::default(),
            runtime: None,
        }
    }

    /// Mounts the filesystem and loads both records into the cache.
    ///
    /// If the mount itself fails, the store stays unhealthy and keeps
    /// running on in-memory defaults — the `Err` is returned only so the
    /// caller can log it; nothing downstream needs to treat it as fatal.
    pub fn begin(&mut self) -> Result<(), PersistenceError> {
        if let Err(error) = self.fs.mount() {
            tracing::error!(%error, "flash filesystem mount failed; continuing with in-memory defaults");
            self.healthy = false;
            return Err(error);
        }
        self.healthy = true;

        match load::<Settings>(&self.fs, SETTINGS_PATH) {
            Loaded::Found(settings) => self.settings = settings,
            Loaded::Absent => {
                self.settings = Settings::default();
            }
            Loaded::Corrupt => {
                tracing::warn!("settings file is unparseable, formatting with defaults");
                self.settings = Settings::default();
                write_json(&mut self.fs, SETTINGS_PATH, &self.settings);
            }
        }

        match load::<RuntimeSnapshot>(&self.fs, RUNTIME_PATH) {
            Loaded::Found(snapshot) => self.runtime = Some(snapshot),
            Loaded::Absent => self.runtime = None,
            Loaded::Corrupt => {
                tracing::warn!("runtime snapshot is unparseable, discarding");
                let _ = self.fs.remove(RUNTIME_PATH);
                self.runtime = None;
            }
        }

        Ok(())
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn runtime_state(&self) -> Option<&RuntimeSnapshot> {
        self.runtime.as_ref()
    }

    pub fn has_valid_runtime_state(&self) -> bool {
        self.runtime.is_some()
    }

    fn flush_settings(&mut self) {
        write_json(&mut self.fs, SETTINGS_PATH, &self.settings);
    }

    pub fn set_custom_preset(&mut self, custom: CustomPreset) {
        self.settings.custom_preset = custom;
        self.flush_settings();
    }

    pub fn set_selected_preset(&mut self, preset: Preset) {
        self.settings.selected_preset = preset;
        self.flush_settings();
    }

    pub fn set_pid_profile(&mut self, profile: PidProfileName) {
        self.settings.pid_profile = profile;
        self.flush_settings();
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.settings.sound_enabled = enabled;
        self.flush_settings();
    }

    /// Persists a runtime recovery snapshot, overwriting any previous one.
    #[allow(clippy::too_many_arguments)]
    pub fn save_runtime_state(
        &mut self,
        state: StateName,
        elapsed: u32,
        target_temp: f32,
        target_time: u32,
        preset: Preset,
        timestamp: u32,
    ) {
        let snapshot = RuntimeSnapshot {
            version: CURRENT_VERSION,
            state,
            elapsed,
            target_temp,
            target_time,
            preset,
            timestamp,
        };
        write_json(&mut self.fs, RUNTIME_PATH, &snapshot);
        self.runtime = Some(snapshot);
    }

    /// Invalidates the cached runtime state and removes its file, if any.
    pub fn clear_runtime_state(&mut self) {
        self.runtime = None;
        if let Err(error) = self.fs.remove(RUNTIME_PATH) {
            tracing::warn!(%error, "failed to remove runtime snapshot");
        }
    }

    /// Records a latched emergency: a free-text marker plus a runtime
    /// snapshot in the `FAILED` state, so a power cycle after an emergency
    /// recovers straight into the failed state rather than resuming drying.
    pub fn save_emergency_state(&mut self, reason: &str, timestamp: u32) {
        if let Err(error) = self.fs.write(EMERGENCY_PATH, reason.as_bytes()) {
            tracing::warn!(%error, "failed to persist emergency reason");
        }
        let preset = self.settings.selected_preset;
        self.save_runtime_state(StateName::Failed, 0, 0.0, 0, preset, timestamp);
    }

    /// The free-text reason recorded by the most recent
    /// [`Store::save_emergency_state`], if the file is still present.
    pub fn emergency_reason(&self) -> Option<String> {
        match self.fs.read(EMERGENCY_PATH) {
            Ok(Some(bytes)) => String::from_utf8(bytes).ok(),
            _ => None,
        }
    }
}
