//! Error types for the watch lifecycle.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use super::lifecycle::LifecycleState;
use crate::io::ExitCode;
use crate::paths::RootError;

/// Errors from watcher operations.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error(transparent)]
    Roots(#[from] RootError),

    #[error("Failed to initialize notification source: {reason}")]
    SourceInit { reason: String },

    #[error("Cannot watch path {}: {reason}", path.display())]
    PathWatchFailed { path: PathBuf, reason: String },

    #[error("Failed to install signal handler: {0}")]
    SignalSetup(#[source] io::Error),

    #[error("Failed to write report: {0}")]
    Output(#[source] io::Error),

    #[error("Operation not valid in state {0:?}")]
    InvalidState(LifecycleState),

    #[error("Event stream ended without a shutdown request")]
    UnexpectedReturn,
}

impl WatchError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            WatchError::Roots(_)
            | WatchError::SourceInit { .. }
            | WatchError::PathWatchFailed { .. }
            | WatchError::SignalSetup(_) => ExitCode::SetupFailed,
            WatchError::Output(_) => ExitCode::OutputFailed,
            WatchError::InvalidState(_) | WatchError::UnexpectedReturn => {
                ExitCode::UnexpectedReturn
            }
        }
    }
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::SourceInit {
            reason: e.to_string(),
        }
    }
}
