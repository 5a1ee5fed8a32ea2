//! Error type shared by the reconciliation engine.
//!
//! Nothing in the engine recovers locally. Every variant travels up to
//! [`crate::run`] and from there to a non-zero exit in `main`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Bad or missing command line input. Raised before any remote call.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The remote rejected a call, stale-version conflicts included.
    #[error("{operation} failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    #[error("prefix list {0} not found")]
    ListNotFound(String),

    #[error("could not decode {operation} response: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },

    #[error("prefix list {id} still in progress after {attempts} polls")]
    WaitTimeout { id: String, attempts: u32 },

    #[error("reconciliation task failed: {0}")]
    Task(String),
}

impl SyncError {
    pub fn remote(operation: &'static str, message: impl Into<String>) -> Self {
        SyncError::Remote {
            operation,
            message: message.into(),
        }
    }
}
