//! Error types for bar lifecycle operations

use std::process::ExitStatus;
use thiserror::Error;

/// Errors raised while drawing, feeding or tearing down renderer processes.
///
/// `MonitorIndex`, `Spawn` and `MissingStdin` are returned to callers of the
/// draw operations. The remaining variants are logged where they occur.
#[derive(Debug, Error)]
pub enum BarError {
    #[error("monitor index {index} out of range ({count} monitors)")]
    MonitorIndex { index: usize, count: usize },

    #[error("failed to launch renderer for {name}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("renderer for {name} has no input stream")]
    MissingStdin { name: String },

    #[error("{name} is not running")]
    NotRunning { name: String },

    #[error("failed to write to {name}")]
    Write {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to close input of {name}")]
    Close {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait for {name}")]
    Wait {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} exited with {status}")]
    Exited { name: String, status: ExitStatus },
}
