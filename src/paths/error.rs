//! Error types for watch root normalization.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning arguments into watch roots.
#[derive(Error, Debug)]
pub enum RootError {
    #[error("{}: Not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("{}: cannot resolve path: {source}", path.display())]
    Resolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no directories to watch")]
    NoWatchTargets,
}

impl RootError {
    /// Whether the failure only concerns a single argument.
    pub fn is_argument_level(&self) -> bool {
        matches!(self, RootError::NotADirectory { .. })
    }
}
