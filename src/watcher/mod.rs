//! Change watching and reporting.
//!
//! # Architecture
//!
//! ```text
//! Lifecycle
//!   - Owns the WatchRegistry, the shutdown token and the source
//!   - Runs the select loop on the tokio runtime
//!         |
//!    +----------------+----------------+
//!    |                |                |
//! NotifySource   EventTranslator   signal::listen
//! (batches in)   (lines out)       (cancels token)
//! ```
//!
//! Sources deliver [`EventBatch`]es over a bounded channel. The run loop
//! translates each batch in order and writes one flushed line per event.

mod error;
mod lifecycle;
mod notify_source;
pub mod signal;
mod source;
mod translator;

pub use error::WatchError;
pub use lifecycle::{CHANNEL_CAPACITY, Lifecycle, LifecycleState, WatchOptions};
pub use notify_source::{NotifySource, event_path};
pub use source::{BatchSender, Event, EventBatch, EventFlags, EventSource, SourceRequest};
pub use translator::{EventTranslator, OutputMode};
