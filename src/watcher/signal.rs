//! Termination signal handling.
//!
//! Signals never tear anything down themselves. They cancel a token that
//! the run loop observes, and the loop performs the shutdown on its own
//! task. If the loop cannot get there (stdout is blocked on a consumer that
//! stopped reading), the listener exits the process once
//! [`SHUTDOWN_GRACE`] has passed.

use std::time::Duration;

use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::WatchError;
use crate::io::ExitCode;

/// How long a requested shutdown may take before the process exits anyway.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Install SIGINT and SIGTERM listeners that cancel `shutdown`.
///
/// Handlers are registered before this returns, so a signal arriving
/// afterwards is never lost. The caller cancels `finished` once teardown is
/// complete; the listener also ends when `shutdown` is cancelled by someone
/// else.
pub fn listen(
    shutdown: CancellationToken,
    finished: CancellationToken,
) -> Result<JoinHandle<()>, WatchError> {
    let mut interrupt = signal(SignalKind::interrupt()).map_err(WatchError::SignalSetup)?;
    let mut terminate = signal(SignalKind::terminate()).map_err(WatchError::SignalSetup)?;

    Ok(tokio::spawn(async move {
        let name = tokio::select! {
            _ = interrupt.recv() => "SIGINT",
            _ = terminate.recv() => "SIGTERM",
            _ = shutdown.cancelled() => return,
        };

        crate::log_event!("signal", "received", "{name}");
        shutdown.cancel();

        if !await_teardown(&finished, SHUTDOWN_GRACE).await {
            tracing::warn!("[signal] shutdown stalled for {SHUTDOWN_GRACE:?}, exiting");
            std::process::exit(i32::from(ExitCode::Success.code()));
        }
    }))
}

/// Wait up to `grace` for `finished`. Returns false if it did not arrive.
pub async fn await_teardown(finished: &CancellationToken, grace: Duration) -> bool {
    tokio::time::timeout(grace, finished.cancelled())
        .await
        .is_ok()
}
