//! Startup, the watch loop, and orderly shutdown.
//!
//! ```text
//! Idle -> Building -> Watching -> ShuttingDown -> Terminated
//! ```
//!
//! The [`Lifecycle`] owns everything the delivery path and the shutdown path
//! share: the registry, the cancellation token and (while watching) the
//! source. Signal handlers only cancel the token; teardown happens here.

use std::ffi::OsStr;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::WatchError;
use super::source::{EventBatch, EventSource, SourceRequest};
use super::translator::{EventTranslator, OutputMode};
use crate::config::Settings;
use crate::paths::{ResolutionPolicy, WatchRegistry, normalize_all};

/// Batches buffered between the source and the run loop.
pub const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Building,
    Watching,
    ShuttingDown,
    Terminated,
}

/// Behaviour selected by configuration and flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    pub preflight: bool,
    pub mode: OutputMode,
    pub latency: Duration,
    pub on_resolution_failure: ResolutionPolicy,
}

impl Default for WatchOptions {
    fn default() -> Self {
        WatchOptions::from(&Settings::default())
    }
}

impl From<&Settings> for WatchOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            preflight: settings.preflight,
            mode: OutputMode::from_sub_directories(settings.sub_directories),
            latency: settings.latency(),
            on_resolution_failure: settings.on_resolution_failure,
        }
    }
}

/// Drives one run of the watcher.
pub struct Lifecycle {
    options: WatchOptions,
    state: LifecycleState,
    registry: Option<Arc<WatchRegistry>>,
    shutdown: CancellationToken,
}

impl Lifecycle {
    pub fn new(options: WatchOptions, shutdown: CancellationToken) -> Self {
        Self {
            options,
            state: LifecycleState::Idle,
            registry: None,
            shutdown,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn registry(&self) -> Option<&Arc<WatchRegistry>> {
        self.registry.as_ref()
    }

    fn transition(&mut self, next: LifecycleState) {
        crate::debug_event!("lifecycle", "state", "{:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Normalize the arguments and build the registry.
    pub fn build<I, S>(&mut self, args: I) -> Result<Arc<WatchRegistry>, WatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        if self.state != LifecycleState::Idle {
            return Err(WatchError::InvalidState(self.state));
        }
        self.transition(LifecycleState::Building);

        let roots = normalize_all(args, self.options.on_resolution_failure)?;
        let registry = Arc::new(WatchRegistry::build(roots)?);

        let resolved: Vec<_> = registry
            .roots()
            .iter()
            .map(|root| String::from_utf8_lossy(root.resolved()).into_owned())
            .collect();
        crate::log_event!("lifecycle", "watching", "{}", resolved.join(" "));

        self.registry = Some(Arc::clone(&registry));
        Ok(registry)
    }

    /// Create the source, optionally print the preflight listing, start
    /// watching and report changes to `out` until shutdown is requested.
    ///
    /// The source is stopped and released on every exit path once created.
    pub async fn watch<F, S, W>(&mut self, create: F, mut out: W) -> Result<(), WatchError>
    where
        F: FnOnce(SourceRequest) -> Result<S, WatchError>,
        S: EventSource + 'static,
        W: Write,
    {
        let registry = match (self.state, &self.registry) {
            (LifecycleState::Building, Some(registry)) => Arc::clone(registry),
            _ => return Err(WatchError::InvalidState(self.state)),
        };

        let translator = EventTranslator::new(Arc::clone(&registry), self.options.mode);
        let (sink, mut batches) = mpsc::channel(CHANNEL_CAPACITY);
        let mut source: Box<dyn EventSource> = Box::new(create(SourceRequest {
            paths: registry.resolved_paths(),
            latency: self.options.latency,
            sink,
        })?);

        let result = self
            .run(&translator, source.as_mut(), &mut batches, &mut out)
            .await;

        self.transition(LifecycleState::ShuttingDown);
        source.stop();
        // Pending batches are discarded, not processed.
        drop(batches);
        source.release();
        self.transition(LifecycleState::Terminated);
        crate::log_event!("lifecycle", "stopped");

        result
    }

    async fn run<W: Write>(
        &mut self,
        translator: &EventTranslator,
        source: &mut dyn EventSource,
        batches: &mut mpsc::Receiver<EventBatch>,
        out: &mut W,
    ) -> Result<(), WatchError> {
        if self.options.preflight {
            translator.write_preflight(out)?;
        }

        source.start()?;
        self.transition(LifecycleState::Watching);
        crate::debug_event!("lifecycle", "started", "{:?} mode", translator.mode());

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => return Ok(()),
                batch = batches.recv() => match batch {
                    Some(batch) => {
                        translator.write_batch(&batch, out)?;
                    }
                    None => return Err(WatchError::UnexpectedReturn),
                },
            }
        }
    }
}
