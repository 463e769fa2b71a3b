//! Boundary to the external filesystem notification source.
//!
//! A source is created with the canonical root paths, a latency hint and a
//! channel. Once started it delivers [`EventBatch`]es on that channel until
//! stopped. Flags are carried through untouched for diagnostics.

use std::path::PathBuf;
use std::time::Duration;

use bitflags::bitflags;
use tokio::sync::mpsc;

use super::WatchError;

bitflags! {
    /// Stream level conditions attached to an event.
    ///
    /// Bit values follow the FSEvents stream flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EventFlags: u32 {
        const MUST_SCAN_SUBDIRS = 0x0000_0001;
        const USER_DROPPED      = 0x0000_0002;
        const KERNEL_DROPPED    = 0x0000_0004;
        const EVENT_IDS_WRAPPED = 0x0000_0008;
        const HISTORY_DONE      = 0x0000_0010;
        const ROOT_CHANGED      = 0x0000_0020;
        const MOUNT             = 0x0000_0040;
        const UNMOUNT           = 0x0000_0080;
    }
}

/// One change reported by the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Absolute canonical path; directories end in a separator.
    pub path: Vec<u8>,
    pub flags: EventFlags,
}

impl Event {
    pub fn new(path: impl Into<Vec<u8>>, flags: EventFlags) -> Self {
        Self {
            path: path.into(),
            flags,
        }
    }
}

/// Events delivered together, in delivery order.
pub type EventBatch = Vec<Event>;

/// Sending half of the delivery channel.
pub type BatchSender = mpsc::Sender<EventBatch>;

/// Everything a source needs to be created.
#[derive(Debug)]
pub struct SourceRequest {
    /// Canonical directories to watch.
    pub paths: Vec<PathBuf>,
    /// How long the source may hold events to coalesce them.
    pub latency: Duration,
    pub sink: BatchSender,
}

/// A running (or runnable) notification source.
///
/// Shutdown calls `stop` then `release`, in that order, exactly once.
pub trait EventSource: Send {
    /// Begin delivering batches.
    fn start(&mut self) -> Result<(), WatchError>;

    /// Stop accepting new events.
    fn stop(&mut self);

    /// Invalidate the source and release its resources.
    fn release(self: Box<Self>);
}
