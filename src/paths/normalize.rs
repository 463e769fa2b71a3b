//! Normalization of user-supplied directory arguments.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::os::unix::ffi::{OsStrExt, OsStringExt};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::SEPARATOR;
use super::error::RootError;

/// What to do when an argument names a directory but cannot be canonicalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPolicy {
    /// Drop the argument with a warning and keep going.
    #[default]
    Skip,
    /// Treat the failure as a setup error for the whole run.
    Abort,
}

/// One directory the user asked to watch.
///
/// `resolved` is absolute, symlink free and ends in exactly one separator,
/// which makes ownership of an event path a plain byte prefix test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRoot {
    /// The argument exactly as typed.
    orig: OsString,
    /// `orig` with a trailing separator guaranteed.
    orig_terminated: Vec<u8>,
    resolved: Vec<u8>,
    resolved_len: usize,
}

/// Append a separator unless `bytes` already ends in one.
pub fn terminate(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 1);
    out.extend_from_slice(bytes);
    if out.last() != Some(&SEPARATOR) {
        out.push(SEPARATOR);
    }
    out
}

impl WatchRoot {
    /// Build a root from an original spelling and an already canonical path.
    ///
    /// Does not touch the filesystem.
    pub fn new(orig: impl Into<OsString>, resolved: impl Into<PathBuf>) -> Self {
        let orig = orig.into();
        let orig_terminated = terminate(orig.as_bytes());
        let resolved = terminate(resolved.into().into_os_string().into_vec().as_slice());
        let resolved_len = resolved.len();
        Self {
            orig,
            orig_terminated,
            resolved,
            resolved_len,
        }
    }

    /// Validate and canonicalize one command line argument.
    pub fn from_arg(arg: &OsStr) -> Result<Self, RootError> {
        Self::from_arg_with(arg, |path| fs::canonicalize(path))
    }

    /// Like [`WatchRoot::from_arg`] with a caller supplied canonicalizer.
    pub fn from_arg_with<F>(arg: &OsStr, canonicalize: F) -> Result<Self, RootError>
    where
        F: FnOnce(&Path) -> io::Result<PathBuf>,
    {
        let path = Path::new(arg);
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => {}
            _ => {
                return Err(RootError::NotADirectory {
                    path: path.to_path_buf(),
                });
            }
        }

        let resolved = canonicalize(path).map_err(|source| RootError::Resolution {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self::new(arg, resolved))
    }

    /// The argument as the user typed it.
    pub fn orig(&self) -> &OsStr {
        &self.orig
    }

    pub fn orig_bytes(&self) -> &[u8] {
        self.orig.as_bytes()
    }

    /// The argument with exactly one trailing separator guaranteed.
    pub fn orig_terminated(&self) -> &[u8] {
        &self.orig_terminated
    }

    /// Whether the user typed the trailing separator themselves.
    pub fn user_terminated(&self) -> bool {
        self.orig.as_bytes().last() == Some(&SEPARATOR)
    }

    pub fn resolved(&self) -> &[u8] {
        &self.resolved
    }

    pub fn resolved_len(&self) -> usize {
        self.resolved_len
    }

    /// Canonical path handed to the notification source, without the
    /// trailing separator unless it is the filesystem root.
    pub fn resolved_path(&self) -> PathBuf {
        let bytes = match self.resolved.as_slice() {
            [SEPARATOR] => &self.resolved[..],
            bytes => &bytes[..bytes.len() - 1],
        };
        PathBuf::from(OsStr::from_bytes(bytes))
    }

    /// Whether this root owns `event_path`.
    pub fn is_prefix_of(&self, event_path: &[u8]) -> bool {
        event_path.starts_with(&self.resolved)
    }

    /// The part of `event_path` that follows `orig` in a sub-path report.
    ///
    /// Starts at the event's own separator unless the user typed one, so
    /// both spellings produce a single separator. `event_path` must be owned
    /// by this root; `resolved_len` is at least 1, so this cannot underflow.
    pub fn sub_path<'a>(&self, event_path: &'a [u8]) -> &'a [u8] {
        let skip = if self.user_terminated() {
            self.resolved_len
        } else {
            self.resolved_len - 1
        };
        &event_path[skip..]
    }
}

/// Normalize every argument, dropping the ones that are not directories.
pub fn normalize_all<I, S>(args: I, policy: ResolutionPolicy) -> Result<Vec<WatchRoot>, RootError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    normalize_with(args, policy, |path| fs::canonicalize(path))
}

/// [`normalize_all`] with a caller supplied canonicalizer.
pub fn normalize_with<I, S, F>(
    args: I,
    policy: ResolutionPolicy,
    mut canonicalize: F,
) -> Result<Vec<WatchRoot>, RootError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    F: FnMut(&Path) -> io::Result<PathBuf>,
{
    let mut roots = Vec::new();

    for arg in args {
        match WatchRoot::from_arg_with(arg.as_ref(), &mut canonicalize) {
            Ok(root) => roots.push(root),
            Err(e) if e.is_argument_level() => tracing::warn!("{e}"),
            Err(e @ RootError::Resolution { .. }) => match policy {
                ResolutionPolicy::Skip => tracing::warn!("{e}"),
                ResolutionPolicy::Abort => return Err(e),
            },
            Err(e) => return Err(e),
        }
    }

    Ok(roots)
}
