//! Translation of canonical event paths back to the user's spelling.

use std::io::Write;
use std::sync::Arc;

use super::WatchError;
use super::source::Event;
use crate::paths::{WatchRegistry, WatchRoot};

/// What each report line contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Only the owning root, as typed.
    #[default]
    Root,
    /// The owning root followed by the changed sub-path.
    SubPath,
}

impl OutputMode {
    pub fn from_sub_directories(enabled: bool) -> Self {
        if enabled {
            OutputMode::SubPath
        } else {
            OutputMode::Root
        }
    }
}

/// Maps event paths to report lines.
#[derive(Debug, Clone)]
pub struct EventTranslator {
    registry: Arc<WatchRegistry>,
    mode: OutputMode,
}

impl EventTranslator {
    pub fn new(registry: Arc<WatchRegistry>, mode: OutputMode) -> Self {
        Self { registry, mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// The newline terminated report line for `event_path`, if any root owns it.
    pub fn translate(&self, event_path: &[u8]) -> Option<Vec<u8>> {
        let owner = self.registry.find_owner(event_path)?;
        Some(self.report_line(owner, event_path))
    }

    fn report_line(&self, owner: &WatchRoot, event_path: &[u8]) -> Vec<u8> {
        let orig = owner.orig_bytes();
        let mut line = Vec::with_capacity(orig.len() + event_path.len() + 1);
        line.extend_from_slice(orig);

        if self.mode == OutputMode::SubPath {
            line.extend_from_slice(owner.sub_path(event_path));
        }

        line.push(b'\n');
        line
    }

    /// Preflight form of a root: slash terminated in sub-path mode.
    pub fn preflight_line(&self, root: &WatchRoot) -> Vec<u8> {
        let name = match self.mode {
            OutputMode::SubPath => root.orig_terminated(),
            OutputMode::Root => root.orig_bytes(),
        };
        let mut line = Vec::with_capacity(name.len() + 1);
        line.extend_from_slice(name);
        line.push(b'\n');
        line
    }

    /// Write one line per registered root, flushing after each.
    pub fn write_preflight<W: Write>(&self, out: &mut W) -> Result<(), WatchError> {
        for root in self.registry.roots() {
            emit(out, &self.preflight_line(root))?;
        }
        Ok(())
    }

    /// Translate and write a batch in delivery order.
    ///
    /// Returns the number of lines written. Unmatched events are skipped;
    /// flags are logged but never stop translation.
    pub fn write_batch<'a, W, I>(&self, events: I, out: &mut W) -> Result<usize, WatchError>
    where
        W: Write,
        I: IntoIterator<Item = &'a Event>,
    {
        let mut written = 0;

        for event in events {
            if !event.flags.is_empty() {
                tracing::warn!(
                    "flags present: {:x} {}",
                    event.flags.bits(),
                    String::from_utf8_lossy(&event.path)
                );
            }

            match self.translate(&event.path) {
                Some(line) => {
                    emit(out, &line)?;
                    written += 1;
                }
                None => crate::debug_event!(
                    "translator",
                    "unmatched",
                    "{}",
                    String::from_utf8_lossy(&event.path)
                ),
            }
        }

        Ok(written)
    }
}

/// Write a whole line and flush it; a failure means the consumer is gone.
fn emit<W: Write>(out: &mut W, line: &[u8]) -> Result<(), WatchError> {
    out.write_all(line).map_err(WatchError::Output)?;
    out.flush().map_err(WatchError::Output)
}
