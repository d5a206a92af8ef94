use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use persistence::errors::PersistenceError;
use persistence::models::{CustomPreset, PidProfileName, Preset, StateName};
use persistence::{Filesystem, Store};

type Files = Rc<RefCell<HashMap<String, Vec<u8>>>>;

/// An in-memory filesystem for exercising `Store`'s self-heal paths without
/// touching real flash (or even a real disk). `handle()` shares the backing
/// map so a test can inspect what was actually written, the way it would
/// inspect a real flash dump.
#[derive(Default)]
struct MemFs {
    files: Files,
    fail_mount: bool,
}

impl MemFs {
    fn handle(&self) -> Files {
        self.files.clone()
    }
}

impl Filesystem for MemFs {
    fn mount(&mut self) -> Result<(), PersistenceError> {
        if self.fail_mount {
            return Err(PersistenceError::MountFailed("simulated mount failure".into()));
        }
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

#[test]
fn begin_on_empty_filesystem_seeds_defaults() {
    let mut store = Store::new(MemFs::default());
    store.begin().unwrap();

    assert!(store.is_healthy());
    assert_eq!(store.settings().selected_preset, Preset::Pla);
    assert!(!store.has_valid_runtime_state());
}

#[test]
fn mount_failure_keeps_running_on_in_memory_defaults() {
    let mut store = Store::new(MemFs { fail_mount: true, ..Default::default() });
    let result = store.begin();

    assert!(result.is_err());
    assert!(!store.is_healthy());
    assert_eq!(store.settings().pid_profile, PidProfileName::Normal);
}

#[test]
fn corrupt_settings_file_is_reformatted_with_defaults() {
    let fs = MemFs::default();
    let files = fs.handle();
    files.borrow_mut().insert("/settings.json".to_string(), b"{ not json".to_vec());

    let mut store = Store::new(fs);
    store.begin().unwrap();

    assert_eq!(*store.settings(), persistence::models::Settings::default());
    let raw = files.borrow().get("/settings.json").cloned().expect("reformatted file");
    assert!(serde_json::from_slice::<persistence::models::Settings>(&raw).is_ok());
}

#[test]
fn settings_at_unknown_version_are_treated_as_absent() {
    let fs = MemFs::default();
    fs.handle().borrow_mut().insert(
        "/settings.json".to_string(),
        serde_json::to_vec(&serde_json::json!({
            "version": 0,
            "customPreset": {"temp": 99.0, "time": 1, "overshoot": 1.0},
            "selectedPreset": "PETG",
            "pidProfile": "STRONG",
            "soundEnabled": false
        }))
        .unwrap(),
    );
    let mut store = Store::new(fs);
    store.begin().unwrap();

    assert_eq!(store.settings().selected_preset, Preset::Pla);
}

#[test]
fn corrupt_runtime_file_is_deleted_and_ignored() {
    let fs = MemFs::default();
    let files = fs.handle();
    files.borrow_mut().insert("/runtime.json".to_string(), b"not json at all".to_vec());

    let mut store = Store::new(fs);
    store.begin().unwrap();

    assert!(!store.has_valid_runtime_state());
    assert!(!files.borrow().contains_key("/runtime.json"));
}

#[test]
fn save_then_load_round_trips_runtime_state() {
    let mut store = Store::new(MemFs::default());
    store.begin().unwrap();

    store.save_runtime_state(StateName::Running, 120, 65.0, 18_000, Preset::Petg, 1_000);
    assert!(store.has_valid_runtime_state());
    let snapshot = store.runtime_state().unwrap();
    assert_eq!(snapshot.state, StateName::Running);
    assert_eq!(snapshot.elapsed, 120);
    assert_eq!(snapshot.preset, Preset::Petg);
}

#[test]
fn clear_runtime_state_invalidates_cache_and_deletes_file() {
    let mut store = Store::new(MemFs::default());
    store.begin().unwrap();
    store.save_runtime_state(StateName::Running, 60, 50.0, 14_400, Preset::Pla, 500);
    assert!(store.has_valid_runtime_state());

    store.clear_runtime_state();

    assert!(!store.has_valid_runtime_state());
}

#[test]
fn emergency_state_persists_reason_and_failed_runtime_snapshot() {
    let mut store = Store::new(MemFs::default());
    store.begin().unwrap();

    store.save_emergency_state("chamber over-temperature: 92.0 >= 90.0", 2_000);

    assert_eq!(store.emergency_reason().unwrap(), "chamber over-temperature: 92.0 >= 90.0");
    let snapshot = store.runtime_state().unwrap();
    assert_eq!(snapshot.state, StateName::Failed);
    assert_eq!(snapshot.timestamp, 2_000);
}

#[test]
fn setters_flush_immediately() {
    let fs = MemFs::default();
    let files = fs.handle();
    let mut store = Store::new(fs);
    store.begin().unwrap();

    store.set_sound_enabled(false);
    store.set_custom_preset(CustomPreset { temp: 55.0, time: 10_000, overshoot: 8.0 });

    let raw = files.borrow().get("/settings.json").cloned().expect("flushed settings file");
    let on_disk: persistence::models::Settings = serde_json::from_slice(&raw).unwrap();
    assert!(!on_disk.sound_enabled);
    assert_eq!(on_disk.custom_preset.temp, 55.0);
}
