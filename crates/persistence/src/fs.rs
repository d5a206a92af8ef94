//! The filesystem capability the store is built on.
//!
//! This crate does not know whether it's running against LittleFS on real
//! flash or an in-memory fake used in tests — it only needs the three
//! operations below. A real implementation wraps whatever flash filesystem
//! the platform provides; `sim::fake_fs::FakeFilesystem` is the in-memory one
//! used by tests.

use crate::errors::PersistenceError;

/// A small flash filesystem capability: mount once at startup, then read,
/// write, and remove whole files by path.
pub trait Filesystem {
    /// Mounts the filesystem. Called exactly once, from [`crate::Store::begin`].
    fn mount(&mut self) -> Result<(), PersistenceError>;

    /// Reads a whole file. Returns `Ok(None)` if the file does not exist.
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>, PersistenceError>;

    /// Writes (overwriting) a whole file.
    fn write(&mut self, path: &str, contents: &[u8]) -> Result<(), PersistenceError>;

    /// Removes a file if it exists; a no-op if it does not.
    fn remove(&mut self, path: &str) -> Result<(), PersistenceError>;
}
