//! Versioned durable storage for the dryer's user settings and runtime
//! recovery state.
//!
//! Records are plain JSON, each carrying a `version` field. A record at an
//! unknown or zero version is treated as absent rather than an error; a
//! settings file that's present but unparseable is reformatted with
//! defaults, while a runtime snapshot in the same state is simply deleted —
//! losing recovery state is safe, losing user settings silently is not worth
//! risking a second failure mode on top of it.
//!
//! ## Example usage
//!
//! ```no_run
//! use persistence::{Filesystem, Store};
//!
//! fn run(fs: impl Filesystem) {
//!     let mut store = Store::new(fs);
//!     store.begin().ok();
//!
//!     if store.has_valid_runtime_state() {
//!         println!("recovering an in-progress cycle");
//!     }
//!
//!     println!("sound enabled: {}", store.settings().sound_enabled);
//! }
//! ```

pub mod errors;
pub mod fs;
pub mod models;
pub mod store;

pub use errors::PersistenceError;
pub use fs::Filesystem;
pub use models::*;
pub use store::Store;
