use thiserror::Error;

/// An error from the durable store. Per the graceful-degradation policy, most
/// of these are logged and swallowed by callers rather than propagated — only
/// `Store::begin` surfaces its result to the caller directly.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("flash filesystem mount failed: {0}")]
    MountFailed(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("record at {0} is corrupt")]
    Corrupt(String),
}
