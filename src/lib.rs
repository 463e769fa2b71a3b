pub mod cli;
pub mod config;
pub mod io;
pub mod logging;
pub mod paths;
pub mod watcher;

pub use config::Settings;
pub use io::ExitCode;
pub use paths::{ResolutionPolicy, RootError, WatchRegistry, WatchRoot};
pub use watcher::{Lifecycle, OutputMode, WatchError, WatchOptions};
