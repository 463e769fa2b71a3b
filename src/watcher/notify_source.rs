//! Notification source backed by `notify` (FSEvents, inotify, ...).
//!
//! notify calls back on its own thread. Those callbacks go through a
//! crossbeam channel to a forwarding thread that groups everything arriving
//! within the latency window into one batch and hands it to the run loop.

use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::WatchError;
use super::source::{BatchSender, Event, EventBatch, EventFlags, EventSource, SourceRequest};
use crate::paths::terminate;

type RawEvent = notify::Result<notify::Event>;

/// [`EventSource`] over a recursive `notify::RecommendedWatcher`.
pub struct NotifySource {
    paths: Vec<PathBuf>,
    watcher: RecommendedWatcher,
    /// Paths successfully registered by `start`.
    watching: Vec<PathBuf>,
    forwarder: Option<JoinHandle<()>>,
}

impl NotifySource {
    /// Create the watcher and its forwarding thread. Nothing is watched
    /// until [`EventSource::start`].
    pub fn create(request: SourceRequest) -> Result<Self, WatchError> {
        let SourceRequest {
            paths,
            latency,
            sink,
        } = request;

        let (tx, rx) = crossbeam_channel::unbounded();
        let watcher = notify::recommended_watcher(move |res: RawEvent| {
            let _ = tx.send(res);
        })?;

        let roots = paths.clone();
        let forwarder = thread::Builder::new()
            .name("zatch-events".to_string())
            .spawn(move || forward(rx, sink, latency, roots))
            .map_err(|e| WatchError::SourceInit {
                reason: e.to_string(),
            })?;

        Ok(Self {
            paths,
            watcher,
            watching: Vec::new(),
            forwarder: Some(forwarder),
        })
    }
}

impl EventSource for NotifySource {
    fn start(&mut self) -> Result<(), WatchError> {
        for path in &self.paths {
            self.watcher
                .watch(path, RecursiveMode::Recursive)
                .map_err(|e| WatchError::PathWatchFailed {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            self.watching.push(path.clone());
            crate::debug_event!("source", "watching", "{}", path.display());
        }
        Ok(())
    }

    fn stop(&mut self) {
        for path in self.watching.drain(..) {
            if let Err(e) = self.watcher.unwatch(&path) {
                crate::debug_event!("source", "unwatch failed", "{}: {e}", path.display());
            }
        }
    }

    fn release(self: Box<Self>) {
        let NotifySource {
            watcher, forwarder, ..
        } = *self;

        // Dropping the watcher closes the callback channel, which ends the
        // forwarding thread once it has nothing left to hand over.
        drop(watcher);
        if let Some(handle) = forwarder {
            if handle.join().is_err() {
                tracing::warn!("[source] event forwarder panicked");
            }
        }
        crate::debug_event!("source", "released");
    }
}

/// Group raw events into batches and pass them to the run loop.
fn forward(rx: Receiver<RawEvent>, sink: BatchSender, latency: Duration, roots: Vec<PathBuf>) {
    while let Ok(first) = rx.recv() {
        let mut batch = EventBatch::new();
        collect(first, &roots, &mut batch);

        let deadline = Instant::now() + latency;
        loop {
            match rx.recv_deadline(deadline) {
                Ok(next) => collect(next, &roots, &mut batch),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if batch.is_empty() {
            continue;
        }

        crate::debug_event!("source", "batch", "{} events", batch.len());
        if sink.blocking_send(batch).is_err() {
            // Run loop is gone; nothing left to deliver to.
            break;
        }
    }
}

/// Convert one notify event into zero or more batch entries.
fn collect(raw: RawEvent, roots: &[PathBuf], batch: &mut EventBatch) {
    let event = match raw {
        Ok(event) => event,
        Err(e) => {
            tracing::warn!("[source] watch error: {e}");
            return;
        }
    };

    if matches!(event.kind, EventKind::Access(_)) {
        return;
    }

    let mut flags = EventFlags::empty();
    if event.need_rescan() {
        flags |= EventFlags::MUST_SCAN_SUBDIRS;
    }

    if event.paths.is_empty() {
        if !flags.is_empty() {
            tracing::warn!("flags present: {:x} (no path)", flags.bits());
        }
        return;
    }

    let removed = matches!(event.kind, EventKind::Remove(_));
    for path in &event.paths {
        let mut path_flags = flags;
        if removed && roots.iter().any(|root| root == path) {
            path_flags |= EventFlags::ROOT_CHANGED;
        }
        batch.push(Event::new(event_path(path), path_flags));
    }
}

/// Raw bytes of `path`, slash terminated when it names a directory.
pub fn event_path(path: &Path) -> Vec<u8> {
    let bytes = path.as_os_str().as_bytes();
    if path.is_dir() {
        terminate(bytes)
    } else {
        bytes.to_vec()
    }
}
