use clap::Parser;
use tokio_util::sync::CancellationToken;
use zatch::cli::Cli;
use zatch::watcher::{Lifecycle, NotifySource, WatchError, WatchOptions, signal};
use zatch::{ExitCode, Settings};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("zatch: {e:#}");
            return ExitCode::SetupFailed.into();
        }
    };
    zatch::logging::init_with_config(&settings.logging);

    match run(&cli, &settings).await {
        Ok(()) => ExitCode::Success.into(),
        Err(e) => {
            eprintln!("zatch: {e}");
            e.exit_code().into()
        }
    }
}

async fn run(cli: &Cli, settings: &Settings) -> Result<(), WatchError> {
    let shutdown = CancellationToken::new();
    let finished = CancellationToken::new();
    let mut lifecycle = Lifecycle::new(WatchOptions::from(settings), shutdown.clone());
    lifecycle.build(&cli.dirs)?;

    let listener = signal::listen(shutdown.clone(), finished.clone())?;
    let result = lifecycle
        .watch(NotifySource::create, std::io::stdout())
        .await;

    finished.cancel();
    // Lets the listener task finish if the run ended on its own.
    shutdown.cancel();
    let _ = listener.await;

    result
}
